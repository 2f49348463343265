// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! The short flags follow the PostgreSQL client tools (`-h`, `-p`, `-U`,
//! `-j`), so clap's own `-h` help shortcut is disabled and help is only
//! available as `--help`.

use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser, ValueEnum};

use crate::types::CommandTimeout;

/// Command-line arguments for `pgbackup`.
///
/// Connection and dump options left unset fall back to the config file, then
/// to the client defaults.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pgbackup",
    version,
    about = "Postgres Backup",
    long_about = None,
    disable_help_flag = true
)]
pub struct CliArgs {
    /// Database server host or socket directory.
    #[arg(short = 'h', value_name = "HOST")]
    pub host: Option<String>,

    /// Database server port number.
    #[arg(short = 'p', value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Connect as specified database user.
    #[arg(short = 'U', value_name = "USER")]
    pub user: Option<String>,

    /// Use this many parallel jobs to dump.
    #[arg(short = 'j', value_name = "NUM", value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: Option<u32>,

    /// Backup directory path. `.` means the directory of this executable.
    #[arg(long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Test mode: enumerate databases but do not dump anything.
    #[arg(long)]
    pub test: bool,

    /// Optional TOML config file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Lock file location (default: `<tmp>/<program>.pid`).
    #[arg(long, value_name = "FILE")]
    pub lock_file: Option<PathBuf>,

    /// Kill any client command running longer than this (e.g. `90m`).
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<CommandTimeout>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PGBACKUP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Show this help message and exit.
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

/// Short usage line, printed when no backup path was given.
pub fn usage() -> String {
    CliArgs::command().render_usage().to_string()
}
