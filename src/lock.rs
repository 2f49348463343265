// src/lock.rs

//! Single-instance guard based on a pid file.
//!
//! State machine: `Absent -> Held(pid) -> Absent`. A lock file left behind by
//! a process that no longer exists is taken over; a file whose content is not
//! a pid is never touched and has to be removed by hand.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use tracing::{error, info, warn};

use crate::errors::LockError;

/// Liveness check for the pid recorded in a lock file.
///
/// Only "no such process" vs "some process" can be told apart: a pid that was
/// reused by an unrelated process still counts as alive, which errs on the
/// side of not running.
pub trait ProcessProbe: Send + Sync {
    fn is_alive(&self, pid: i32) -> bool;

    fn current_pid(&self) -> i32 {
        std::process::id() as i32
    }
}

/// Probe that sends signal 0 to the pid.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalProbe;

impl ProcessProbe for SignalProbe {
    fn is_alive(&self, pid: i32) -> bool {
        match kill(Pid::from_raw(pid), None) {
            Ok(()) => true,
            // Exists, but owned by someone else.
            Err(Errno::EPERM) => true,
            Err(_) => false,
        }
    }
}

/// How a lock was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    Fresh,
    /// Taken over from a process that is no longer running.
    RecoveredStale { previous: i32 },
}

/// Creates and validates the lock file at one path.
pub struct LockManager<'a> {
    path: PathBuf,
    probe: &'a dyn ProcessProbe,
}

impl<'a> LockManager<'a> {
    pub fn new(path: impl Into<PathBuf>, probe: &'a dyn ProcessProbe) -> Self {
        Self {
            path: path.into(),
            probe,
        }
    }

    /// Take the lock for the current process.
    pub fn acquire(&self) -> Result<LockHandle, LockError> {
        let pid = self.probe.current_pid();

        // Fast path: nobody holds the lock.
        match self.create_new(pid) {
            Ok(()) => {
                info!(path = ?self.path, pid, "lock acquired");
                return Ok(self.handle(pid, Acquisition::Fresh));
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(source) => return Err(self.io_error(source)),
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let recorded = content.lines().next().unwrap_or("").trim();

        let Some(previous) = parse_pid(recorded) else {
            error!(
                path = ?self.path,
                content = %recorded,
                "lock file exists but does not hold a valid pid; remove it manually"
            );
            return Err(LockError::Corrupt {
                path: self.path.clone(),
                content: recorded.to_string(),
            });
        };

        if self.probe.is_alive(previous) {
            error!(path = ?self.path, pid = previous, "lock file exists and its process is running");
            return Err(LockError::Held {
                path: self.path.clone(),
                pid: previous,
            });
        }

        warn!(
            path = ?self.path,
            pid = previous,
            "lock file exists but its process is gone; taking over"
        );
        fs::write(&self.path, format!("{pid}\n")).map_err(|e| self.io_error(e))?;
        info!(path = ?self.path, pid, "lock acquired");
        Ok(self.handle(pid, Acquisition::RecoveredStale { previous }))
    }

    fn create_new(&self, pid: i32) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)?;
        writeln!(file, "{pid}")?;
        file.sync_all()
    }

    fn handle(&self, pid: i32, acquisition: Acquisition) -> LockHandle {
        LockHandle {
            path: self.path.clone(),
            pid,
            acquisition,
        }
    }

    fn io_error(&self, source: io::Error) -> LockError {
        error!(path = ?self.path, error = %source, "lock file access failed");
        LockError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Proof that the current process holds the lock.
///
/// Dropping the handle does not remove the file; call [`LockHandle::release`]
/// so a failed removal can be reported.
#[derive(Debug)]
pub struct LockHandle {
    path: PathBuf,
    pid: i32,
    acquisition: Acquisition,
}

impl LockHandle {
    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn acquisition(&self) -> Acquisition {
        self.acquisition
    }

    pub fn release(self) -> Result<(), LockError> {
        fs::remove_file(&self.path).map_err(|source| {
            error!(path = ?self.path, error = %source, "failed to delete lock file");
            LockError::Io {
                path: self.path.clone(),
                source,
            }
        })?;
        info!(path = ?self.path, "lock released");
        Ok(())
    }
}

/// Pids are positive decimal integers; `0` and negatives would address
/// process groups when probed.
fn parse_pid(s: &str) -> Option<i32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<i32>().ok().filter(|pid| *pid > 0)
}
