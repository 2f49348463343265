// src/postgres/mod.rs

//! Thin wrappers over the PostgreSQL client programs.
//!
//! Every function builds a [`ShellCommand`], runs it through the configured
//! [`ShellExecutor`], and logs the command, exit state and captured output
//! at the point a failure is detected.

pub mod listing;

use std::path::Path;

use tracing::{debug, error};

use crate::errors::{DumpError, EnumerationError};
use crate::exec::{CommandOutput, ShellCommand, ShellExecutor};
use crate::types::{BackupTarget, ClientBinaries, ConnectionParams};

pub use listing::parse_listing;

/// Result of asking the server which databases to back up.
#[derive(Debug)]
pub enum Enumeration {
    Targets(Vec<BackupTarget>),
    /// The listing succeeded but named no database worth dumping.
    Empty,
    Failed(EnumerationError),
}

/// Client for one server, bound to an executor.
pub struct PgClient<'a> {
    connection: &'a ConnectionParams,
    binaries: &'a ClientBinaries,
    shell: &'a dyn ShellExecutor,
}

impl<'a> PgClient<'a> {
    pub fn new(
        connection: &'a ConnectionParams,
        binaries: &'a ClientBinaries,
        shell: &'a dyn ShellExecutor,
    ) -> Self {
        Self {
            connection,
            binaries,
            shell,
        }
    }

    /// `-h <host> -p <port> -U <user>`; the host flag is omitted when empty
    /// so the client falls back to its default socket.
    fn base_command(&self, program: &str) -> ShellCommand {
        let mut cmd = ShellCommand::new(program);
        if !self.connection.host.is_empty() {
            cmd = cmd.arg("-h").arg(&self.connection.host);
        }
        cmd.arg("-p")
            .arg(self.connection.port.to_string())
            .arg("-U")
            .arg(&self.connection.user)
    }

    pub fn version_command(&self) -> ShellCommand {
        self.base_command(&self.binaries.psql)
            .args(["-tA", "-c", "SHOW server_version;"])
    }

    pub fn listing_command(&self) -> ShellCommand {
        self.base_command(&self.binaries.psql).args(["-t", "-l"])
    }

    pub fn dump_command(&self, target: &BackupTarget, jobs: u32, out: &Path) -> ShellCommand {
        self.base_command(&self.binaries.pg_dump)
            .arg("-j")
            .arg(jobs.to_string())
            .arg("-Fd")
            .arg(target.as_str())
            .arg("-f")
            .arg(out.to_string_lossy())
    }

    pub fn globals_command(&self, out: &Path) -> ShellCommand {
        self.base_command(&self.binaries.pg_dumpall)
            .arg("--globals-only")
            .arg("-f")
            .arg(out.to_string_lossy())
    }

    /// Server version string, or `None` when the probe failed.
    pub async fn server_version(&self) -> Option<String> {
        let cmd = self.version_command();
        let out = self.shell.execute(&cmd).await;
        let version = out.text().trim().to_string();
        if !out.success() || version.is_empty() {
            log_failure(&cmd, &out);
            return None;
        }
        Some(version)
    }

    pub async fn list_targets(&self) -> Enumeration {
        let cmd = self.listing_command();
        let out = self.shell.execute(&cmd).await;

        if !out.success() {
            log_failure(&cmd, &out);
            return Enumeration::Failed(EnumerationError::Command {
                command: cmd.to_string(),
                status: out.status,
                output: out.text(),
            });
        }
        if out.output.is_empty() {
            log_failure(&cmd, &out);
            return Enumeration::Failed(EnumerationError::NoOutput {
                command: cmd.to_string(),
            });
        }

        let targets = parse_listing(&out.text());
        debug!(count = targets.len(), "parsed database listing");
        if targets.is_empty() {
            Enumeration::Empty
        } else {
            Enumeration::Targets(targets)
        }
    }

    /// Directory-format, parallel dump of one database into `out`.
    pub async fn dump_target(
        &self,
        target: &BackupTarget,
        jobs: u32,
        out: &Path,
    ) -> Result<(), DumpError> {
        let cmd = self.dump_command(target, jobs, out);
        self.run_dump(cmd).await
    }

    /// Roles and tablespaces into the single file `out`.
    pub async fn dump_globals(&self, out: &Path) -> Result<(), DumpError> {
        let cmd = self.globals_command(out);
        self.run_dump(cmd).await
    }

    async fn run_dump(&self, cmd: ShellCommand) -> Result<(), DumpError> {
        let out = self.shell.execute(&cmd).await;
        if out.success() {
            return Ok(());
        }
        log_failure(&cmd, &out);
        Err(DumpError {
            command: cmd.to_string(),
            status: out.status,
            output: out.text(),
        })
    }
}

fn log_failure(cmd: &ShellCommand, out: &CommandOutput) {
    error!(
        cmd = %cmd,
        status = %out.status,
        output = %out.text().trim_end(),
        "external command failed"
    );
}
