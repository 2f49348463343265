// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod lock;
pub mod logging;
pub mod postgres;
pub mod publish;
pub mod types;

use std::path::Path;

use chrono::{DateTime, Local};
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{load_and_validate, resolve, resolve_dest_root};
use crate::engine::{BackupRun, RunReport};
use crate::errors::{BackupError, Result};
use crate::exec::RealShellExecutor;
use crate::lock::SignalProbe;
use crate::types::RunContext;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and merging with the command line
/// - the run context (with the run timestamp captured by the caller)
/// - the real process executor and liveness probe
/// - the backup run itself
///
/// `Err` means the run was refused before any lock or dump activity, or the
/// lock could not be taken.
pub async fn run(args: CliArgs, program: &Path, started_at: DateTime<Local>) -> Result<RunReport> {
    let file = args.config.as_ref().map(load_and_validate).transpose()?;
    let settings = resolve(&args, file.as_ref(), program)?;

    let Some(path) = settings.path.as_deref() else {
        eprint!("{}", cli::usage());
        return Err(BackupError::Config(
            "backup directory path is required (--path)".to_string(),
        ));
    };

    let ctx = RunContext {
        dest_root: resolve_dest_root(path)?,
        connection: settings.connection,
        binaries: settings.binaries,
        jobs: settings.jobs,
        lock_path: settings.lock_path,
        test_mode: settings.test_mode,
        command_timeout: settings.command_timeout,
        started_at,
    };
    debug!(?ctx, "run context");

    let shell = RealShellExecutor::new(ctx.command_timeout);
    BackupRun::new(&ctx, &shell, &SignalProbe).execute().await
}
