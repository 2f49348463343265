#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use pgbackup::config::{ConfigFile, RawConfigFile};
use pgbackup::types::{ClientBinaries, ConnectionParams, RunContext};

/// Render database names the way `psql -t -l` prints them.
pub fn listing_output(names: &[&str]) -> String {
    let mut out = String::new();
    for name in names {
        out.push_str(&format!(
            " {name:<12} | postgres | UTF8     | libc            | C.UTF-8 | C.UTF-8 |            |           | \n"
        ));
    }
    out.push('\n');
    out
}

/// Builder for `RunContext` with a fixed, known timestamp.
pub struct RunContextBuilder {
    ctx: RunContext,
}

impl RunContextBuilder {
    pub fn new(dest_root: &Path, lock_path: &Path) -> Self {
        Self {
            ctx: RunContext {
                connection: ConnectionParams::default(),
                binaries: ClientBinaries::default(),
                jobs: 5,
                dest_root: dest_root.to_path_buf(),
                lock_path: lock_path.to_path_buf(),
                test_mode: false,
                command_timeout: None,
                started_at: fixed_time(),
            },
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.ctx.connection.host = host.to_string();
        self
    }

    pub fn jobs(mut self, jobs: u32) -> Self {
        self.ctx.jobs = jobs;
        self
    }

    pub fn test_mode(mut self, on: bool) -> Self {
        self.ctx.test_mode = on;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.ctx.command_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> RunContext {
        self.ctx
    }
}

/// 2024-03-05 07:08:09 local time, i.e. stamp `2024.03.05_070809`.
pub fn fixed_time() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 3, 5, 7, 8, 9)
        .single()
        .expect("unambiguous local time")
}

/// Run directory for [`fixed_time`].
pub fn fixed_run_dir(dest_root: &Path) -> PathBuf {
    dest_root.join("2024.03.05_070809")
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct RawConfigBuilder {
    config: RawConfigFile,
}

impl RawConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.config.connection.host = Some(host.to_string());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.connection.port = Some(port);
        self
    }

    pub fn jobs(mut self, jobs: u32) -> Self {
        self.config.dump.jobs = Some(jobs);
        self
    }

    pub fn timeout(mut self, timeout: &str) -> Self {
        self.config.dump.timeout = Some(timeout.to_string());
        self
    }

    pub fn pg_dump(mut self, program: &str) -> Self {
        self.config.dump.pg_dump = Some(program.to_string());
        self
    }

    pub fn path(mut self, path: &str) -> Self {
        self.config.run.path = Some(PathBuf::from(path));
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for RawConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
