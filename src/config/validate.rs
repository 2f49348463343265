// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{BackupError, Result};
use crate::types::CommandTimeout;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = BackupError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_connection(cfg)?;
    validate_dump(cfg)?;
    validate_run(cfg)?;
    Ok(())
}

fn validate_connection(cfg: &RawConfigFile) -> Result<()> {
    if cfg.connection.port == Some(0) {
        return Err(BackupError::Config(
            "[connection].port must be >= 1 (got 0)".to_string(),
        ));
    }
    if let Some(user) = &cfg.connection.user {
        if user.trim().is_empty() {
            return Err(BackupError::Config(
                "[connection].user must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_dump(cfg: &RawConfigFile) -> Result<()> {
    if cfg.dump.jobs == Some(0) {
        return Err(BackupError::Config(
            "[dump].jobs must be >= 1 (got 0)".to_string(),
        ));
    }

    let programs = [
        ("psql", &cfg.dump.psql),
        ("pg_dump", &cfg.dump.pg_dump),
        ("pg_dumpall", &cfg.dump.pg_dumpall),
    ];
    for (key, value) in programs {
        if value.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(BackupError::Config(format!(
                "[dump].{key} must not be empty"
            )));
        }
    }

    if let Some(timeout) = &cfg.dump.timeout {
        timeout.parse::<CommandTimeout>().map_err(|e| {
            BackupError::Config(format!("[dump].timeout: {e}"))
        })?;
    }
    Ok(())
}

fn validate_run(cfg: &RawConfigFile) -> Result<()> {
    if cfg
        .run
        .path
        .as_ref()
        .is_some_and(|p| p.as_os_str().is_empty())
    {
        return Err(BackupError::Config("[run].path must not be empty".to_string()));
    }
    if cfg
        .run
        .lock_file
        .as_ref()
        .is_some_and(|p| p.as_os_str().is_empty())
    {
        return Err(BackupError::Config(
            "[run].lock_file must not be empty".to_string(),
        ));
    }
    Ok(())
}
