//! # gitcache CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test runs
//! the compiled `gitcache` binary with a clean environment so that a
//! developer's own `BLOB_URL` or `~/.config/gitcache/config.toml` cannot leak
//! into the assertions.
//!

#![allow(dead_code)]

pub use assert_cmd::Command;
use tempfile::TempDir;

/// # Get gitcache Command (`gitcache_cmd`)
///
/// Returns an `assert_cmd::Command` for the `gitcache` binary with
/// `BLOB_URL`, `GITCACHE_SCRATCH_ROOT` and `RUST_LOG` removed and the user
/// config directory pointed at `config_home`.
pub fn gitcache_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gitcache").expect("Failed to find gitcache binary for testing");
    cmd.env_remove("BLOB_URL")
        .env_remove("GITCACHE_SCRATCH_ROOT")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path());
    cmd
}

/// `file://` URL for a local directory, usable as a blob store location.
pub fn file_url(dir: &std::path::Path) -> String {
    format!("file://{}", dir.display())
}

/// A port on 127.0.0.1 with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

/// Whether a usable `git` binary is on PATH.
pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Runs git in `dir` with a fixed identity and commit dates.
pub fn git(dir: &std::path::Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .args(["-c", "user.name=Snap Shot", "-c", "user.email=snap@example.com"])
        .args(["-c", "commit.gpgsign=false", "-c", "init.defaultBranch=main"])
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_DATE", "2024-05-01T10:20:30+02:00")
        .env("GIT_COMMITTER_DATE", "2024-05-01T10:20:30+02:00")
        .status()
        .expect("failed to run git");
    assert!(status.success(), "git {:?} failed", args);
}

/// A `git daemon` serving every repository under a base directory over
/// `git://127.0.0.1:<port>/`. Killed on drop.
pub struct GitDaemon {
    child: std::process::Child,
    pub port: u16,
}

impl GitDaemon {
    /// Starts the daemon and waits until it accepts connections.
    /// Returns `None` if it never comes up (e.g. `git daemon` not installed).
    pub fn start(base_path: &std::path::Path) -> Option<Self> {
        let port = closed_port();
        let child = std::process::Command::new("git")
            .arg("daemon")
            .arg("--export-all")
            .arg("--reuseaddr")
            .arg("--listen=127.0.0.1")
            .arg(format!("--port={}", port))
            .arg(format!("--base-path={}", base_path.display()))
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .ok()?;
        let mut daemon = GitDaemon { child, port };
        for _ in 0..100 {
            if std::net::TcpStream::connect(("127.0.0.1", port)).is_ok() {
                return Some(daemon);
            }
            if let Ok(Some(_)) = daemon.child.try_wait() {
                return None;
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
        }
        let _ = daemon.child.kill();
        None
    }
}

impl Drop for GitDaemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
