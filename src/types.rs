use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Local};

/// Name under which server-wide objects (roles, tablespaces) are dumped.
pub const GLOBALS_NAME: &str = "globals";

/// Databases that are never dumped individually.
///
/// The globals sentinel is included so a database that happens to be called
/// `globals` cannot collide with the globals artifact.
pub const EXCLUDED_NAMES: [&str; 4] = [GLOBALS_NAME, "postgres", "template0", "template1"];

/// Directory name format for one run: `YYYY.MM.DD_HHMMSS`.
pub const STAMP_FORMAT: &str = "%Y.%m.%d_%H%M%S";

/// One database selected for an individual dump.
///
/// Can only be built through [`BackupTarget::new`], which rejects every name
/// in [`EXCLUDED_NAMES`] (case-insensitively).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackupTarget(String);

impl BackupTarget {
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() || is_excluded(&name) {
            return None;
        }
        Some(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackupTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_excluded(name: &str) -> bool {
    EXCLUDED_NAMES
        .iter()
        .any(|excluded| excluded.eq_ignore_ascii_case(name))
}

/// A unit of work that produces one artifact under the run directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpUnit {
    Database(BackupTarget),
    Globals,
}

impl DumpUnit {
    pub fn name(&self) -> &str {
        match self {
            DumpUnit::Database(target) => target.as_str(),
            DumpUnit::Globals => GLOBALS_NAME,
        }
    }
}

impl fmt::Display for DumpUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How to reach the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Host name or socket directory; empty means the client default.
    pub host: String,
    pub port: u16,
    pub user: String,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 5432,
            user: "postgres".to_string(),
        }
    }
}

/// Names of the external client programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientBinaries {
    pub psql: String,
    pub pg_dump: String,
    pub pg_dumpall: String,
}

impl Default for ClientBinaries {
    fn default() -> Self {
        Self {
            psql: "psql".to_string(),
            pg_dump: "pg_dump".to_string(),
            pg_dumpall: "pg_dumpall".to_string(),
        }
    }
}

/// Everything one invocation needs, fixed for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub connection: ConnectionParams,
    pub binaries: ClientBinaries,
    /// Parallel jobs handed to `pg_dump -j`.
    pub jobs: u32,
    /// Absolute destination root.
    pub dest_root: PathBuf,
    pub lock_path: PathBuf,
    /// When set, dumps and publishes are logged but not performed.
    pub test_mode: bool,
    pub command_timeout: Option<Duration>,
    /// Captured once; every artifact of the run is grouped under it.
    pub started_at: DateTime<Local>,
}

impl RunContext {
    pub fn stamp(&self) -> String {
        self.started_at.format(STAMP_FORMAT).to_string()
    }

    /// Directory holding every published artifact of this run.
    pub fn run_dir(&self) -> PathBuf {
        self.dest_root.join(self.stamp())
    }

    /// Working location the dump tool writes to before publication.
    pub fn temp_path(&self, unit: &DumpUnit) -> PathBuf {
        self.dest_root
            .join(format!("_tmp_{}_{}", unit.name(), self.stamp()))
    }

    pub fn dest_path(&self, unit: &DumpUnit) -> PathBuf {
        self.run_dir().join(unit.name())
    }
}

/// Default lock location: `<temp dir>/<program file name>.pid`.
pub fn default_lock_path(program: &Path) -> PathBuf {
    let name = program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pgbackup".to_string());
    std::env::temp_dir().join(format!("{name}.pid"))
}

/// Command timeout as written in config or on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTimeout(pub Duration);

impl FromStr for CommandTimeout {
    type Err = String;

    /// Parse a simple duration string like `"30s"`, `"250ms"`, `"5m"`, `"2h"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty duration string".to_string());
        }

        // Find the boundary between digits and suffix.
        let idx = s
            .chars()
            .position(|c| !c.is_ascii_digit())
            .ok_or_else(|| "duration missing unit suffix".to_string())?;

        let (num_part, unit_part) = s.split_at(idx);
        let value: u64 = num_part
            .parse()
            .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
        let unit = unit_part.trim().to_lowercase();

        let secs_per_unit = |factor: u64| {
            value
                .checked_mul(factor)
                .map(Duration::from_secs)
                .ok_or_else(|| format!("duration too large: '{}'", s))
        };
        let duration = match unit.as_str() {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => secs_per_unit(60)?,
            "h" => secs_per_unit(60 * 60)?,
            _ => {
                return Err(format!(
                    "unsupported duration unit '{}'; expected ms, s, m, or h",
                    unit
                ));
            }
        };
        if duration.is_zero() {
            return Err("timeout must be greater than zero".to_string());
        }
        Ok(CommandTimeout(duration))
    }
}
