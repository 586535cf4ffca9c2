//! Cooperative cancellation
//!
//! A run checks the flag between resource kinds and between catalog pages,
//! never in the middle of fetching an item. The first SIGINT/SIGTERM sets the
//! flag; a second one terminates the process immediately.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::warn;

use crate::error::{BackupResult, ConnectBackupError};

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a flag driven by SIGINT and SIGTERM
    pub fn from_signals() -> io::Result<Self> {
        let flag = Self::new();
        for signal in [SIGINT, SIGTERM] {
            // exit on the second signal if the first one has not stopped us yet
            signal_hook::flag::register_conditional_shutdown(signal, 130, Arc::clone(&flag.cancelled))?;
            signal_hook::flag::register(signal, Arc::clone(&flag.cancelled))?;
        }
        Ok(flag)
    }

    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            warn!("cancellation requested");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Return `Cancelled` once the flag is set
    pub fn check(&self) -> BackupResult<()> {
        if self.is_cancelled() {
            Err(ConnectBackupError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let handle = flag.clone();
        assert!(flag.check().is_ok());

        handle.cancel();
        assert!(flag.is_cancelled());
        assert!(flag.check().unwrap_err().is_cancelled());
    }
}
