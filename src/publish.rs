// src/publish.rs

//! Moving finished dumps from their working location into the run directory.
//!
//! Publication is all-or-nothing from the caller's point of view: either the
//! destination appears complete and the temporary artifact is gone, or the
//! destination does not appear at all.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::errors::PublishError;

/// Move `temp` to `dest`, creating `dest`'s parent directory if needed.
///
/// A same-filesystem rename is used whenever possible. When the two paths
/// are on different filesystems the artifact is copied next to `dest`,
/// verified, renamed into place and only then removed from `temp`.
pub fn publish(temp: &Path, dest: &Path) -> Result<(), PublishError> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }

    if dest.symlink_metadata().is_ok() {
        error!(dest = ?dest, "destination already exists");
        return Err(PublishError::DestinationExists(dest.to_path_buf()));
    }

    match fs::rename(temp, dest) {
        Ok(()) => {
            info!(from = ?temp, to = ?dest, "dump published");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            warn!(from = ?temp, to = ?dest, "rename crosses filesystems; copying instead");
            copy_across(temp, dest)
        }
        Err(source) => {
            error!(from = ?temp, to = ?dest, error = %source, "failed to move dump");
            Err(PublishError::Rename {
                from: temp.to_path_buf(),
                to: dest.to_path_buf(),
                source,
            })
        }
    }
}

fn ensure_dir(dir: &Path) -> Result<(), PublishError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => {
            error!(path = ?dir, "is not a directory");
            Err(PublishError::ParentNotDirectory(dir.to_path_buf()))
        }
        Err(_) => fs::create_dir_all(dir).map_err(|source| {
            error!(path = ?dir, error = %source, "failed to create directory");
            PublishError::CreateParent {
                path: dir.to_path_buf(),
                source,
            }
        }),
    }
}

fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    dest.with_file_name(name)
}

/// The cross-filesystem half of [`publish`]: copy to `<dest>.partial`,
/// verify, rename into place, then remove `temp`.
#[doc(hidden)]
pub fn copy_across(temp: &Path, dest: &Path) -> Result<(), PublishError> {
    let staging = staging_path(dest);
    if staging.symlink_metadata().is_ok() {
        debug!(path = ?staging, "removing leftover staging copy");
        if let Err(e) = remove_any(&staging) {
            warn!(path = ?staging, error = %e, "failed to remove leftover staging copy");
        }
    }

    let staged = copy_tree(temp, &staging)
        .map_err(|source| PublishError::CopyFallback {
            from: temp.to_path_buf(),
            source,
        })
        .and_then(|()| verify_copy(temp, &staging))
        .and_then(|()| {
            fs::rename(&staging, dest).map_err(|source| PublishError::Rename {
                from: staging.clone(),
                to: dest.to_path_buf(),
                source,
            })
        });

    if let Err(err) = staged {
        error!(from = ?temp, to = ?dest, error = %err, "cross-filesystem publish failed");
        if let Err(e) = remove_any(&staging) {
            warn!(path = ?staging, error = %e, "failed to remove staging copy");
        }
        return Err(err);
    }

    // The destination is complete at this point; a leftover original is
    // still reported so the run is flagged.
    remove_any(temp).map_err(|source| {
        error!(path = ?temp, error = %source, "published copy, but failed to remove original");
        PublishError::CopyFallback {
            from: temp.to_path_buf(),
            source,
        }
    })?;

    info!(from = ?temp, to = ?dest, "dump published by copy");
    Ok(())
}

fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = if rel.as_os_str().is_empty() {
            dst.to_path_buf()
        } else {
            dst.join(rel)
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir(&target)?;
        } else if file_type.is_symlink() {
            std::os::unix::fs::symlink(fs::read_link(entry.path())?, &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Relative path → (is directory, byte length) for every entry under `root`.
fn manifest(root: &Path) -> io::Result<BTreeMap<PathBuf, (bool, u64)>> {
    let mut entries = BTreeMap::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(io::Error::other)?;
        let meta = entry.metadata().map_err(io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(io::Error::other)?
            .to_path_buf();
        let len = if meta.is_file() { meta.len() } else { 0 };
        entries.insert(rel, (meta.is_dir(), len));
    }
    Ok(entries)
}

fn verify_copy(src: &Path, copy: &Path) -> Result<(), PublishError> {
    let verify_err = |reason: String| PublishError::Verify {
        from: src.to_path_buf(),
        reason,
    };

    let original = manifest(src).map_err(|e| verify_err(e.to_string()))?;
    let copied = manifest(copy).map_err(|e| verify_err(e.to_string()))?;
    if original != copied {
        return Err(verify_err(format!(
            "{} entries in original, {} in copy or sizes differ",
            original.len(),
            copied.len()
        )));
    }
    Ok(())
}

fn remove_any(path: &Path) -> io::Result<()> {
    if path.symlink_metadata()?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
