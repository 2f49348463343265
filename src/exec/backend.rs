// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! Everything that talks to the database goes through a `ShellExecutor`
//! instead of spawning processes directly. This makes it easy to swap in a
//! scripted fake in tests while keeping the production implementation in
//! [`process`](super::process).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::command::{CommandOutput, ShellCommand};
use super::process::run_command;

/// Trait abstracting how external commands are executed.
///
/// Implementations never fail outright: spawn errors and timeouts are folded
/// into [`CommandOutput::status`] so callers have a single place to look.
pub trait ShellExecutor: Send + Sync {
    fn execute<'a>(
        &'a self,
        command: &'a ShellCommand,
    ) -> Pin<Box<dyn Future<Output = CommandOutput> + Send + 'a>>;
}

/// Real executor backend used in production.
#[derive(Debug, Clone, Default)]
pub struct RealShellExecutor {
    timeout: Option<Duration>,
}

impl RealShellExecutor {
    /// Commands running longer than `timeout` are killed and reported as
    /// [`ExitState::TimedOut`](super::ExitState::TimedOut).
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ShellExecutor for RealShellExecutor {
    fn execute<'a>(
        &'a self,
        command: &'a ShellCommand,
    ) -> Pin<Box<dyn Future<Output = CommandOutput> + Send + 'a>> {
        Box::pin(run_command(command, self.timeout))
    }
}
