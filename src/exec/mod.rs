// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for running the PostgreSQL client programs,
//! using `tokio::process::Command`, and handing back their exit state and
//! combined output.
//!
//! - [`command`] describes a command as program + argument vector with the
//!   forced locale environment.
//! - [`process`] spawns one command and collects its merged output.
//! - [`backend`] provides the `ShellExecutor` trait and a concrete
//!   `RealShellExecutor` that the run uses in production, and which tests
//!   can replace with a scripted implementation.

pub mod backend;
pub mod command;
pub mod process;

pub use backend::{RealShellExecutor, ShellExecutor};
pub use command::{CommandOutput, ExitState, FORCED_ENV, ShellCommand};
pub use process::run_command;
