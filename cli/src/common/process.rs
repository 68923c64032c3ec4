//! # gitcache Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! Runs external programs (in practice, `git`) through
//! `tokio::process::Command` and captures their output. A non-zero exit
//! becomes `GitCacheError::ExternalCommand` carrying the command line, the
//! exit status and the trimmed stderr, so callers can fold it into their own
//! error domain.
//!
//! stdin is always closed: a child that wants to prompt (for example git
//! asking for credentials) fails instead of hanging.
//!
//! ## Usage
//!
//! ```rust
//! let output = process::run_command_capture(
//!     "git",
//!     &["show", "-s", "--format=%H", "HEAD"],
//!     Some(repo_dir),
//!     &[("GIT_TERMINAL_PROMPT", "0")],
//! )
//! .await?;
//! println!("HEAD is {}", output.stdout.trim());
//! ```
//!
use crate::core::error::{GitCacheError, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, trace};

/// Captured output of a successful command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs `program` with `args`, optionally inside `cwd`, with extra `env`
/// variables, and waits for it to finish.
///
/// # Errors
///
/// - `GitCacheError::ExternalCommand` if the program cannot be spawned or
///   exits unsuccessfully.
pub async fn run_command_capture(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    env: &[(&str, &str)],
) -> Result<CommandOutput> {
    let cmd_line = format_command(program, args);
    debug!("Running: {}", cmd_line);

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    for (key, value) in env {
        cmd.env(key, value);
    }

    let output = cmd.output().await.map_err(|e| GitCacheError::ExternalCommand {
        cmd: cmd_line.clone(),
        status: "failed to spawn".to_string(),
        output: e.to_string(),
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    trace!("{} stderr: {}", cmd_line, stderr.trim());

    if !output.status.success() {
        anyhow::bail!(GitCacheError::ExternalCommand {
            cmd: cmd_line,
            status: output.status.to_string(),
            output: stderr.trim().to_string(),
        });
    }

    Ok(CommandOutput { stdout, stderr })
}

fn format_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
