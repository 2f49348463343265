// src/engine/summary.rs

//! Start and end lines framing a run in the log.

use std::path::Path;

use chrono::{DateTime, Local, TimeDelta};
use nix::unistd::{gethostname, getpid, getppid};
use tracing::info;

/// Identity of this invocation, logged when the run starts and ends.
#[derive(Debug, Clone)]
pub struct RunBanner {
    started_at: DateTime<Local>,
    host: String,
    pid: i32,
    ppid: i32,
    program: String,
}

impl RunBanner {
    pub fn new(started_at: DateTime<Local>, program: &Path) -> Self {
        let host = gethostname()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());
        let program = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            started_at,
            host,
            pid: getpid().as_raw(),
            ppid: getppid().as_raw(),
            program,
        }
    }

    pub fn log_start(&self) {
        info!(
            started = %self.started_at,
            host = %self.host,
            pid = self.pid,
            ppid = self.ppid,
            name = %self.program,
            "backup run started"
        );
    }

    pub fn log_finish(&self, succeeded: bool) {
        let now = Local::now();
        info!(
            finished = %now,
            pid = self.pid,
            elapsed = %format_elapsed(now - self.started_at),
            result = succeeded,
            "backup run finished"
        );
    }
}

/// `H:MM:SS.ffffff`, clamped at zero if the clock went backwards.
pub fn format_elapsed(delta: TimeDelta) -> String {
    let delta = delta.max(TimeDelta::zero());
    let secs = delta.num_seconds();
    let micros = delta.subsec_nanos() / 1_000;
    format!(
        "{}:{:02}:{:02}.{:06}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        micros
    )
}
