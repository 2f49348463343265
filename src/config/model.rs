// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [connection]
/// host = "db1"
/// port = 5432
/// user = "postgres"
///
/// [dump]
/// jobs = 5
/// timeout = "2h"
///
/// [run]
/// path = "/backups"
/// ```
///
/// All sections and keys are optional; anything left out falls back to the
/// command line or to the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub connection: ConnectionSection,

    #[serde(default)]
    pub dump: DumpSection,

    #[serde(default)]
    pub run: RunSection,
}

/// `[connection]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionSection {
    /// Host name or socket directory.
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
}

/// `[dump]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DumpSection {
    /// Parallel jobs passed to `pg_dump -j`.
    pub jobs: Option<u32>,

    /// Client program overrides, e.g. a versioned `/usr/lib/postgresql/16/bin/pg_dump`.
    pub psql: Option<String>,
    pub pg_dump: Option<String>,
    pub pg_dumpall: Option<String>,

    /// Duration string (e.g. `"30m"`) after which a client command is killed.
    pub timeout: Option<String>,
}

/// `[run]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Destination root.
    pub path: Option<PathBuf>,
    pub lock_file: Option<PathBuf>,
}

/// A `RawConfigFile` that passed validation.
///
/// Only constructible through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    raw: RawConfigFile,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self { raw }
    }

    pub fn connection(&self) -> &ConnectionSection {
        &self.raw.connection
    }

    pub fn dump(&self) -> &DumpSection {
        &self.raw.dump
    }

    pub fn run(&self) -> &RunSection {
        &self.raw.run
    }

    pub fn into_raw(self) -> RawConfigFile {
        self.raw
    }
}
