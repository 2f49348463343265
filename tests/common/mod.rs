#![allow(dead_code)]

pub use pgbackup_test_utils::builders;
pub use pgbackup_test_utils::init_tracing;

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Scratch destination root plus a lock path outside of it.
pub struct Sandbox {
    pub dir: TempDir,
    pub root: PathBuf,
    pub lock: PathBuf,
}

pub fn sandbox() -> Sandbox {
    let dir = tempfile::tempdir().expect("create temp dir");
    let root = dir.path().join("backups");
    std::fs::create_dir(&root).expect("create backup root");
    let lock = dir.path().join("pgbackup.pid");
    Sandbox { dir, root, lock }
}

/// Sorted names of the entries directly under `dir`.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|rd| {
            rd.map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
