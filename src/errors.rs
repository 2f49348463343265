// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

use crate::exec::ExitState;
use crate::fs::AccessError;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Backup directory: {0}")]
    Access(#[from] AccessError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Why the single-instance lock could not be taken or dropped.
#[derive(Error, Debug)]
pub enum LockError {
    #[error("lock file {path:?} is held by running process {pid}")]
    Held { path: PathBuf, pid: i32 },

    #[error("lock file {path:?} has unexpected content {content:?}; remove it manually")]
    Corrupt { path: PathBuf, content: String },

    #[error("lock file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An external dump command that did not exit cleanly.
#[derive(Error, Debug)]
#[error("`{command}` finished with {status}")]
pub struct DumpError {
    pub command: String,
    pub status: ExitState,
    pub output: String,
}

/// Target listing could not be obtained from the server.
#[derive(Error, Debug)]
pub enum EnumerationError {
    #[error("`{command}` finished with {status}")]
    Command {
        command: String,
        status: ExitState,
        output: String,
    },

    #[error("`{command}` produced no output")]
    NoOutput { command: String },
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("is not a directory: {0:?}")]
    ParentNotDirectory(PathBuf),

    #[error("failed to create directory {path:?}: {source}")]
    CreateParent {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("destination already exists: {0:?}")]
    DestinationExists(PathBuf),

    #[error("failed to move {from:?} to {to:?}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cross-device copy of {from:?} failed: {source}")]
    CopyFallback {
        from: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("copy of {from:?} does not match the original: {reason}")]
    Verify { from: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, BackupError>;
