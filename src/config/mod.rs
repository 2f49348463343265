// src/config/mod.rs

//! Configuration loading, validation and merging for pgbackup.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like positive job counts (`validate.rs`).
//! - Merge the file with the command line into [`Settings`].

pub mod loader;
pub mod model;
pub mod validate;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::CliArgs;
use crate::errors::{BackupError, Result};
use crate::fs::AccessError;
use crate::types::{ClientBinaries, CommandTimeout, ConnectionParams, default_lock_path};

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, ConnectionSection, DumpSection, RawConfigFile, RunSection};

/// Effective settings after applying CLI > config file > defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub connection: ConnectionParams,
    pub binaries: ClientBinaries,
    pub jobs: u32,
    /// Destination root exactly as given; `None` when neither source set it.
    pub path: Option<PathBuf>,
    pub lock_path: PathBuf,
    pub test_mode: bool,
    pub command_timeout: Option<Duration>,
}

/// Merge the command line with an optional config file.
///
/// `program` is the path this process was started as; it names the default
/// lock file.
pub fn resolve(args: &CliArgs, file: Option<&ConfigFile>, program: &Path) -> Result<Settings> {
    let raw = file.cloned().map(ConfigFile::into_raw).unwrap_or_default();
    let defaults = ConnectionParams::default();
    let default_bins = ClientBinaries::default();

    let connection = ConnectionParams {
        host: args
            .host
            .clone()
            .or(raw.connection.host)
            .unwrap_or(defaults.host),
        port: args.port.or(raw.connection.port).unwrap_or(defaults.port),
        user: args
            .user
            .clone()
            .or(raw.connection.user)
            .unwrap_or(defaults.user),
    };

    let binaries = ClientBinaries {
        psql: raw.dump.psql.unwrap_or(default_bins.psql),
        pg_dump: raw.dump.pg_dump.unwrap_or(default_bins.pg_dump),
        pg_dumpall: raw.dump.pg_dumpall.unwrap_or(default_bins.pg_dumpall),
    };

    let command_timeout = match args.timeout {
        Some(CommandTimeout(d)) => Some(d),
        None => raw
            .dump
            .timeout
            .as_deref()
            .map(|s| {
                s.parse::<CommandTimeout>()
                    .map(|t| t.0)
                    .map_err(|e| BackupError::Config(format!("[dump].timeout: {e}")))
            })
            .transpose()?,
    };

    Ok(Settings {
        connection,
        binaries,
        jobs: args.jobs.or(raw.dump.jobs).unwrap_or(5),
        path: args.path.clone().or(raw.run.path),
        lock_path: args
            .lock_file
            .clone()
            .or(raw.run.lock_file)
            .unwrap_or_else(|| default_lock_path(program)),
        test_mode: args.test,
        command_timeout,
    })
}

/// Turn the user-supplied backup path into an absolute one.
///
/// `.` is special-cased to the directory of the running executable, so a
/// tool dropped into the backup directory can be started with `--path .`
/// from anywhere. An empty path is reported as not specified.
pub fn resolve_dest_root(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(AccessError::NotSpecified.into());
    }
    if path == Path::new(".") {
        let exe = std::env::current_exe()?;
        return exe.parent().map(Path::to_path_buf).ok_or_else(|| {
            BackupError::Config(format!("cannot determine directory of {exe:?}"))
        });
    }
    Ok(std::path::absolute(path)?)
}
