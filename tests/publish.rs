// tests/publish.rs

mod common;
use crate::common::{entries, init_tracing, sandbox};

use std::os::unix::fs::MetadataExt;
use std::os::unix::net::UnixListener;
use std::path::Path;

use pgbackup::errors::PublishError;
use pgbackup::publish::{copy_across, publish};

fn write_dump_dir(dir: &Path) {
    std::fs::create_dir_all(dir.join("blobs")).unwrap();
    std::fs::write(dir.join("toc.dat"), b"toc").unwrap();
    std::fs::write(dir.join("3001.dat.gz"), b"rows").unwrap();
    std::fs::write(dir.join("blobs").join("blob_1.dat"), b"blob").unwrap();
}

#[test]
fn directory_artifact_is_moved_with_parent_created() {
    init_tracing();
    let sb = sandbox();
    let temp = sb.root.join("_tmp_app_db_2024.03.05_070809");
    std::fs::create_dir(&temp).unwrap();
    std::fs::write(temp.join("toc.dat"), b"toc").unwrap();
    std::fs::write(temp.join("3001.dat.gz"), b"rows").unwrap();
    let dest = sb.root.join("2024.03.05_070809").join("app_db");

    publish(&temp, &dest).unwrap();

    assert!(!temp.exists());
    assert_eq!(entries(&dest), vec!["3001.dat.gz", "toc.dat"]);
    assert_eq!(std::fs::read(dest.join("toc.dat")).unwrap(), b"toc");
}

#[test]
fn file_artifact_is_moved_into_existing_run_dir() {
    init_tracing();
    let sb = sandbox();
    let run_dir = sb.root.join("2024.03.05_070809");
    std::fs::create_dir(&run_dir).unwrap();
    let temp = sb.root.join("_tmp_globals_2024.03.05_070809");
    std::fs::write(&temp, "CREATE ROLE app;\n").unwrap();
    let dest = run_dir.join("globals");

    publish(&temp, &dest).unwrap();

    assert!(!temp.exists());
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "CREATE ROLE app;\n");
}

#[test]
fn parent_that_is_a_file_is_rejected() {
    init_tracing();
    let sb = sandbox();
    let blocker = sb.root.join("2024.03.05_070809");
    std::fs::write(&blocker, "not a dir").unwrap();
    let temp = sb.root.join("_tmp_globals");
    std::fs::write(&temp, "data").unwrap();

    let err = publish(&temp, &blocker.join("globals")).unwrap_err();

    assert!(matches!(err, PublishError::ParentNotDirectory(_)), "got {err:?}");
    assert_eq!(std::fs::read_to_string(&temp).unwrap(), "data");
}

#[test]
fn existing_destination_is_not_overwritten() {
    init_tracing();
    let sb = sandbox();
    let temp = sb.root.join("_tmp_globals");
    std::fs::write(&temp, "new").unwrap();
    let dest = sb.root.join("globals");
    std::fs::write(&dest, "old").unwrap();

    let err = publish(&temp, &dest).unwrap_err();

    assert!(matches!(err, PublishError::DestinationExists(_)));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "old");
    assert_eq!(std::fs::read_to_string(&temp).unwrap(), "new");
}

#[test]
fn missing_artifact_leaves_no_destination() {
    init_tracing();
    let sb = sandbox();
    let temp = sb.root.join("_tmp_never_written");
    let dest = sb.root.join("run").join("never_written");

    let err = publish(&temp, &dest).unwrap_err();

    assert!(matches!(err, PublishError::Rename { .. }));
    assert!(!dest.exists());
}

#[test]
fn copy_fallback_moves_nested_tree_and_removes_original() {
    init_tracing();
    let sb = sandbox();
    let temp = sb.root.join("_tmp_app_db");
    write_dump_dir(&temp);
    let dest = sb.root.join("app_db");

    copy_across(&temp, &dest).unwrap();

    assert!(!temp.exists());
    assert_eq!(entries(&sb.root), vec!["app_db"]);
    assert_eq!(entries(&dest), vec!["3001.dat.gz", "blobs", "toc.dat"]);
    assert_eq!(std::fs::read(dest.join("blobs").join("blob_1.dat")).unwrap(), b"blob");
}

#[test]
fn copy_fallback_handles_single_file_artifact() {
    init_tracing();
    let sb = sandbox();
    let temp = sb.root.join("_tmp_globals");
    std::fs::write(&temp, "CREATE ROLE app;\n").unwrap();
    let dest = sb.root.join("globals");

    copy_across(&temp, &dest).unwrap();

    assert!(!temp.exists());
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "CREATE ROLE app;\n");
}

#[test]
fn failed_copy_leaves_no_destination_and_no_staging() {
    init_tracing();
    let sb = sandbox();
    let temp = sb.root.join("_tmp_app_db");
    write_dump_dir(&temp);
    // A socket cannot be opened for reading, so the copy fails part way.
    let _listener = UnixListener::bind(temp.join("sock")).unwrap();
    let dest = sb.root.join("app_db");

    let err = copy_across(&temp, &dest).unwrap_err();

    assert!(matches!(err, PublishError::CopyFallback { .. }), "got {err:?}");
    assert!(!dest.exists());
    assert!(!sb.root.join("app_db.partial").exists());
    assert_eq!(entries(&sb.root), vec!["_tmp_app_db"]);
    assert!(temp.join("toc.dat").is_file());
}

#[test]
fn leftover_staging_copy_is_replaced() {
    init_tracing();
    let sb = sandbox();
    let temp = sb.root.join("_tmp_app_db");
    write_dump_dir(&temp);
    let stale = sb.root.join("app_db.partial");
    std::fs::create_dir(&stale).unwrap();
    std::fs::write(stale.join("junk"), b"old").unwrap();
    let dest = sb.root.join("app_db");

    copy_across(&temp, &dest).unwrap();

    assert!(!stale.exists());
    assert_eq!(entries(&dest), vec!["3001.dat.gz", "blobs", "toc.dat"]);
}

#[test]
fn rename_across_filesystems_falls_back_to_copy() {
    init_tracing();
    let Ok(shm) = tempfile::tempdir_in("/dev/shm") else {
        eprintln!("skipping: /dev/shm is not available");
        return;
    };
    let sb = sandbox();
    let shm_dev = std::fs::metadata(shm.path()).unwrap().dev();
    let root_dev = std::fs::metadata(&sb.root).unwrap().dev();
    if shm_dev == root_dev {
        eprintln!("skipping: /dev/shm and the temp dir share a filesystem");
        return;
    }

    let temp = shm.path().join("_tmp_app_db");
    write_dump_dir(&temp);
    let dest = sb.root.join("2024.03.05_070809").join("app_db");

    publish(&temp, &dest).unwrap();

    assert!(!temp.exists());
    assert_eq!(entries(&dest), vec!["3001.dat.gz", "blobs", "toc.dat"]);
    assert_eq!(entries(&sb.root.join("2024.03.05_070809")), vec!["app_db"]);
}
