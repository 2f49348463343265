// src/exec/process.rs

//! Individual command process runner.

use std::io::Read;
use std::os::unix::process::ExitStatusExt;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, warn};

use super::command::{CommandOutput, ExitState, ShellCommand};

/// How long to keep collecting output after a timed-out child was killed.
/// Grandchildren that inherited the pipe may keep it open past that.
const DRAIN_GRACE: Duration = Duration::from_secs(5);

/// Run one command to completion and capture its merged output.
///
/// Spawn and wait errors are reported as [`ExitState::SpawnFailed`] with the
/// error text as output; they never escape as `Err`.
pub async fn run_command(command: &ShellCommand, timeout: Option<Duration>) -> CommandOutput {
    match run_command_inner(command, timeout).await {
        Ok(out) => out,
        Err(err) => CommandOutput {
            status: ExitState::SpawnFailed,
            output: format!("{err:#}").into_bytes(),
        },
    }
}

async fn run_command_inner(
    command: &ShellCommand,
    timeout: Option<Duration>,
) -> Result<CommandOutput> {
    debug!(cmd = %command, "starting command");

    // stdout and stderr share one pipe so the captured stream keeps the
    // child's own interleaving.
    let (reader, writer) = std::io::pipe().context("creating output pipe")?;

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::from(
            writer.try_clone().context("duplicating output pipe")?,
        ))
        .stderr(Stdio::from(writer))
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning `{}`", command.program))?;

    // The command still owns our copies of the write end; the reader only
    // sees EOF once they are closed.
    drop(cmd);

    let collector = tokio::task::spawn_blocking(move || {
        let mut reader = reader;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).map(|_| buf)
    });

    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(res) => Some(res.with_context(|| format!("waiting for `{}`", command.program))?),
            Err(_) => {
                warn!(cmd = %command, ?limit, "command timed out; killing process");
                if let Err(e) = child.kill().await {
                    warn!(cmd = %command, error = %e, "failed to kill timed out process");
                }
                None
            }
        },
        None => Some(
            child
                .wait()
                .await
                .with_context(|| format!("waiting for `{}`", command.program))?,
        ),
    };

    let output = match status {
        Some(_) => collector
            .await
            .context("joining output reader")?
            .context("reading command output")?,
        None => match tokio::time::timeout(DRAIN_GRACE, collector).await {
            Ok(joined) => joined
                .context("joining output reader")?
                .context("reading command output")?,
            Err(_) => Vec::new(),
        },
    };

    let state = match status {
        None => ExitState::TimedOut,
        Some(status) => match (status.code(), status.signal()) {
            (Some(code), _) => ExitState::Exited(code),
            (None, Some(sig)) => ExitState::Signaled(sig),
            (None, None) => ExitState::Exited(-1),
        },
    };

    debug!(cmd = %command, status = %state, bytes = output.len(), "command finished");

    Ok(CommandOutput {
        status: state,
        output,
    })
}
