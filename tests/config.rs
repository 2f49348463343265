// tests/config.rs

mod common;
use crate::common::builders::RawConfigBuilder;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use pgbackup::cli::CliArgs;
use pgbackup::config::{ConfigFile, load_and_validate, resolve, resolve_dest_root};
use pgbackup::errors::BackupError;
use pgbackup::fs::AccessError;
use pgbackup::types::{CommandTimeout, default_lock_path};
use tempfile::NamedTempFile;

fn args(argv: &[&str]) -> CliArgs {
    CliArgs::try_parse_from(std::iter::once("pgbackup").chain(argv.iter().copied()))
        .expect("valid arguments")
}

#[test]
fn defaults_match_the_client_tools() {
    let settings = resolve(&args(&["--path", "/backups"]), None, Path::new("/usr/bin/pgbackup"))
        .unwrap();

    assert_eq!(settings.connection.host, "");
    assert_eq!(settings.connection.port, 5432);
    assert_eq!(settings.connection.user, "postgres");
    assert_eq!(settings.jobs, 5);
    assert_eq!(settings.binaries.pg_dump, "pg_dump");
    assert_eq!(settings.path, Some(PathBuf::from("/backups")));
    assert_eq!(settings.lock_path, std::env::temp_dir().join("pgbackup.pid"));
    assert!(!settings.test_mode);
    assert_eq!(settings.command_timeout, None);
}

#[test]
fn short_flags_follow_postgres_conventions() {
    let a = args(&[
        "-h", "db1", "-p", "6432", "-U", "backup", "-j", "8", "--path", "/srv", "--test",
    ]);

    assert_eq!(a.host.as_deref(), Some("db1"));
    assert_eq!(a.port, Some(6432));
    assert_eq!(a.user.as_deref(), Some("backup"));
    assert_eq!(a.jobs, Some(8));
    assert!(a.test);
}

#[test]
fn zero_jobs_or_port_are_rejected_on_the_command_line() {
    assert!(CliArgs::try_parse_from(["pgbackup", "-j", "0"]).is_err());
    assert!(CliArgs::try_parse_from(["pgbackup", "-p", "0"]).is_err());
}

#[test]
fn command_line_overrides_config_file() {
    let file = RawConfigBuilder::new()
        .host("filehost")
        .port(6000)
        .jobs(2)
        .timeout("10m")
        .pg_dump("/opt/pg16/bin/pg_dump")
        .path("/from/file")
        .build();

    let settings = resolve(
        &args(&["-h", "clihost", "--timeout", "30s"]),
        Some(&file),
        Path::new("pgbackup"),
    )
    .unwrap();

    assert_eq!(settings.connection.host, "clihost");
    assert_eq!(settings.connection.port, 6000);
    assert_eq!(settings.jobs, 2);
    assert_eq!(settings.binaries.pg_dump, "/opt/pg16/bin/pg_dump");
    assert_eq!(settings.path, Some(PathBuf::from("/from/file")));
    assert_eq!(settings.command_timeout, Some(Duration::from_secs(30)));
}

#[test]
fn missing_path_stays_unset() {
    let settings = resolve(&args(&[]), None, Path::new("pgbackup")).unwrap();
    assert_eq!(settings.path, None);
}

#[test]
fn lock_path_is_named_after_the_program() {
    assert_eq!(
        default_lock_path(Path::new("/opt/tools/pg_backup.py")),
        std::env::temp_dir().join("pg_backup.py.pid")
    );
    let settings = resolve(
        &args(&["--lock-file", "/run/pgbackup.pid"]),
        None,
        Path::new("pgbackup"),
    )
    .unwrap();
    assert_eq!(settings.lock_path, PathBuf::from("/run/pgbackup.pid"));
}

#[test]
fn timeouts_parse_with_units() {
    assert_eq!("250ms".parse::<CommandTimeout>(), Ok(CommandTimeout(Duration::from_millis(250))));
    assert_eq!("2h".parse::<CommandTimeout>(), Ok(CommandTimeout(Duration::from_secs(7200))));
    assert!("0s".parse::<CommandTimeout>().is_err());
    assert!("10".parse::<CommandTimeout>().is_err());
    assert!("5d".parse::<CommandTimeout>().is_err());

    let huge = "99999999999999999h".parse::<CommandTimeout>();
    assert!(huge.unwrap_err().contains("too large"));
    assert!("999999999999999999m".parse::<CommandTimeout>().is_err());
}

#[test]
fn toml_file_is_loaded() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[connection]
host = "db1"
user = "backup"

[dump]
jobs = 3

[run]
path = "/backups"
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.connection().host.as_deref(), Some("db1"));
    assert_eq!(cfg.dump().jobs, Some(3));
    assert_eq!(cfg.run().path, Some(PathBuf::from("/backups")));
}

#[test]
fn invalid_values_are_config_errors() {
    for raw in [
        RawConfigBuilder::new().jobs(0).raw(),
        RawConfigBuilder::new().port(0).raw(),
        RawConfigBuilder::new().timeout("soon").raw(),
        RawConfigBuilder::new().pg_dump("  ").raw(),
    ] {
        match ConfigFile::try_from(raw) {
            Err(BackupError::Config(_)) => {}
            other => panic!("expected config error, got {other:?}"),
        }
    }
}

#[test]
fn unknown_keys_are_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[dump]\nretention = 7\n").unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(BackupError::Toml(_))
    ));
}

#[test]
fn dot_path_means_executable_directory() {
    let exe_dir = std::env::current_exe()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf();
    assert_eq!(resolve_dest_root(Path::new(".")).unwrap(), exe_dir);

    let relative = resolve_dest_root(Path::new("backups")).unwrap();
    assert!(relative.is_absolute());
    assert!(relative.ends_with("backups"));
}

#[test]
fn empty_path_is_not_specified() {
    assert!(matches!(
        resolve_dest_root(Path::new("")),
        Err(BackupError::Access(AccessError::NotSpecified))
    ));
}
