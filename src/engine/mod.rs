// src/engine/mod.rs

//! Orchestration engine for pgbackup.
//!
//! One run walks through a fixed sequence of stages:
//! - destination check and lock acquisition (fatal on failure)
//! - server version probe
//! - database enumeration
//! - dump + publish per database
//! - dump + publish of the globals
//! - lock release
//!
//! From the version probe on, every stage is attempted even if earlier ones
//! failed; their results are collected into a [`RunReport`].
//!
//! The sequencing lives in [`run`]; the start/end banner in [`summary`].

use std::fmt;

pub mod run;
pub mod summary;

pub use run::BackupRun;
pub use summary::RunBanner;

/// One recorded step of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    VersionProbe,
    Enumerate,
    /// Dump of the named unit (a database or the globals).
    Dump(String),
    Publish(String),
    ReleaseLock,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::VersionProbe => f.write_str("version probe"),
            Stage::Enumerate => f.write_str("enumeration"),
            Stage::Dump(unit) => write!(f, "dump {unit}"),
            Stage::Publish(unit) => write!(f, "publish {unit}"),
            Stage::ReleaseLock => f.write_str("lock release"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub stage: Stage,
    pub ok: bool,
}

/// Everything a run attempted, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    stages: Vec<StageResult>,
}

impl RunReport {
    pub fn record(&mut self, stage: Stage, ok: bool) {
        self.stages.push(StageResult { stage, ok });
    }

    pub fn stages(&self) -> &[StageResult] {
        &self.stages
    }

    /// True iff no recorded stage failed.
    pub fn succeeded(&self) -> bool {
        self.stages.iter().all(|s| s.ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter().filter(|s| !s.ok).map(|s| &s.stage)
    }

    pub fn attempted(&self, stage: &Stage) -> bool {
        self.stages.iter().any(|s| &s.stage == stage)
    }
}
