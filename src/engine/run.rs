// src/engine/run.rs

use std::fs;
use std::path::Path;

use tracing::{error, info, warn};

use crate::engine::{RunReport, Stage};
use crate::errors::Result;
use crate::exec::ShellExecutor;
use crate::fs::check_writable_dir;
use crate::lock::{Acquisition, LockManager, ProcessProbe};
use crate::postgres::{Enumeration, PgClient};
use crate::publish::publish;
use crate::types::{DumpUnit, RunContext};

/// Drives one backup run against a single server.
pub struct BackupRun<'a> {
    ctx: &'a RunContext,
    shell: &'a dyn ShellExecutor,
    probe: &'a dyn ProcessProbe,
}

impl<'a> BackupRun<'a> {
    pub fn new(
        ctx: &'a RunContext,
        shell: &'a dyn ShellExecutor,
        probe: &'a dyn ProcessProbe,
    ) -> Self {
        Self { ctx, shell, probe }
    }

    /// Run every stage and report what happened.
    ///
    /// Returns `Err` only when the destination root is unusable or the lock
    /// cannot be taken; nothing has been dumped in that case. Any later
    /// failure is recorded in the report and the run carries on.
    pub async fn execute(&self) -> Result<RunReport> {
        let ctx = self.ctx;

        check_writable_dir(&ctx.dest_root).inspect_err(|err| {
            error!(path = ?ctx.dest_root, error = %err, "backup directory is not usable");
        })?;

        let lock = LockManager::new(&ctx.lock_path, self.probe).acquire()?;
        if let Acquisition::RecoveredStale { previous } = lock.acquisition() {
            warn!(previous, "recovered stale lock");
        }

        let mut report = RunReport::default();
        let pg = PgClient::new(&ctx.connection, &ctx.binaries, self.shell);

        let version = pg.server_version().await;
        info!(
            version = version.as_deref().unwrap_or("unknown"),
            "PostgreSQL server version"
        );
        report.record(Stage::VersionProbe, version.is_some());

        let targets = match pg.list_targets().await {
            Enumeration::Targets(targets) => {
                info!(
                    count = targets.len(),
                    databases = ?targets.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
                    "databases to back up"
                );
                report.record(Stage::Enumerate, true);
                targets
            }
            Enumeration::Empty => {
                error!("databases not found");
                report.record(Stage::Enumerate, false);
                Vec::new()
            }
            Enumeration::Failed(err) => {
                error!(error = %err, "database enumeration failed");
                report.record(Stage::Enumerate, false);
                Vec::new()
            }
        };

        for target in targets {
            self.back_up(&pg, DumpUnit::Database(target), &mut report)
                .await;
        }
        self.back_up(&pg, DumpUnit::Globals, &mut report).await;

        report.record(Stage::ReleaseLock, lock.release().is_ok());

        for stage in report.failures() {
            error!(%stage, "stage failed");
        }
        Ok(report)
    }

    /// Dump one unit to its temporary path and publish it on success.
    async fn back_up(&self, pg: &PgClient<'_>, unit: DumpUnit, report: &mut RunReport) {
        let ctx = self.ctx;
        let name = unit.name().to_string();
        let temp = ctx.temp_path(&unit);
        let dest = ctx.dest_path(&unit);

        info!(unit = %name, "dumping ...");
        if ctx.test_mode {
            info!(unit = %name, dest = ?dest, "passed (test)");
            report.record(Stage::Dump(name), true);
            return;
        }

        let dumped = match &unit {
            DumpUnit::Database(target) => pg.dump_target(target, ctx.jobs, &temp).await,
            DumpUnit::Globals => pg.dump_globals(&temp).await,
        };
        if let Err(err) = dumped {
            error!(unit = %name, error = %err, "failed to create dump");
            discard_partial(&temp);
            report.record(Stage::Dump(name), false);
            return;
        }
        info!(unit = %name, "successfully dumped");
        report.record(Stage::Dump(name.clone()), true);

        let published = publish(&temp, &dest);
        report.record(Stage::Publish(name), published.is_ok());
    }
}

/// Remove whatever a failed dump left at its temporary path.
fn discard_partial(temp: &Path) {
    let Ok(meta) = temp.symlink_metadata() else {
        return;
    };
    let removed = if meta.is_dir() {
        fs::remove_dir_all(temp)
    } else {
        fs::remove_file(temp)
    };
    if let Err(e) = removed {
        warn!(path = ?temp, error = %e, "failed to remove partial dump");
    }
}
