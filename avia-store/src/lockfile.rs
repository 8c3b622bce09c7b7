//! File-presence advisory lock serializing reload → mutate → persist cycles
//! across threads and processes sharing the same data directory.
//!
//! The token is created with `create_new`, which is atomic at the filesystem
//! level, so at most one holder exists at a time. The owner label written
//! into the token is advisory only. There is no reentrancy: a holder that
//! acquires again blocks against itself until its own guard drops (or the
//! bounded wait, when configured, times out).

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("timed out after {0:?} waiting for the lock")]
    Timeout(Duration),

    #[error("lock file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to the lock token path plus the contention policy.
#[derive(Debug, Clone)]
pub struct FileLock {
    path: PathBuf,
    retry_interval: Duration,
    acquire_timeout: Option<Duration>,
}

impl FileLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retry_interval: Duration::from_millis(200),
            acquire_timeout: None,
        }
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Bound the wait instead of retrying forever.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    /// Block until the token can be created, then hand out a guard that
    /// removes it when dropped, on every exit path including panics.
    pub fn acquire(&self) -> Result<LockGuard, LockError> {
        let started = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&self.path) {
                Ok(mut token) => {
                    // Advisory owner label; no payload is semantically required.
                    let _ = write!(token, "{}:{}", std::process::id(), Uuid::new_v4());
                    debug!(path = %self.path.display(), "lock acquired");
                    return Ok(LockGuard {
                        path: self.path.clone(),
                    });
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    if let Some(timeout) = self.acquire_timeout {
                        if started.elapsed() >= timeout {
                            return Err(LockError::Timeout(timeout));
                        }
                    }
                    trace!(path = %self.path.display(), "waiting for the lock");
                    std::thread::sleep(self.retry_interval);
                }
                Err(err) => return Err(LockError::Io(err)),
            }
        }
    }
}

/// Holds the lock; releasing is dropping. Removing an already-missing token
/// is a no-op, so release is idempotent.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    /// Explicit release for callers that want to surface the point in the
    /// control flow; equivalent to dropping the guard.
    pub fn release(self) {}
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "lock released"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => debug!(path = %self.path.display(), %err, "could not remove lock token"),
        }
    }
}
