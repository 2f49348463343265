// src/fs/mod.rs

//! Filesystem preconditions checked before a run touches anything.

use std::path::Path;

use nix::unistd::{AccessFlags, access};
use thiserror::Error;

/// Why a directory cannot be used as the destination root.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AccessError {
    #[error("directory is not specified")]
    NotSpecified,

    #[error("does not exist: {0:?}")]
    Missing(std::path::PathBuf),

    #[error("is not directory: {0:?}")]
    NotDirectory(std::path::PathBuf),

    #[error("access denied: {0:?} (rw)")]
    Denied(std::path::PathBuf),
}

/// Require `dir` to be an existing directory the current user may write to.
pub fn check_writable_dir(dir: &Path) -> Result<(), AccessError> {
    if dir.as_os_str().is_empty() {
        return Err(AccessError::NotSpecified);
    }
    let meta = match std::fs::metadata(dir) {
        Ok(meta) => meta,
        Err(_) => return Err(AccessError::Missing(dir.to_path_buf())),
    };
    if !meta.is_dir() {
        return Err(AccessError::NotDirectory(dir.to_path_buf()));
    }
    access(dir, AccessFlags::W_OK).map_err(|_| AccessError::Denied(dir.to_path_buf()))
}
