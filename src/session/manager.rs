//! Session manager.
//!
//! The session is a two-state machine, `Idle` and `Active`. `open` moves
//! Idle to Active or fails with [`Error::Busy`]; `release` moves Active back
//! to Idle. Opening never waits: a second opener is turned away at once.

use crate::error::{Error, Result};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Status text generated by a successful open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage(String);

impl StatusMessage {
    fn for_open(open_count: u64) -> Self {
        Self(format!("Count {}\n", open_count))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of the session slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Whether a session currently holds the slot.
    pub active: bool,
    /// Successful opens over the lifetime of the manager.
    pub open_count: u64,
    /// Read offset into the status message.
    pub status_cursor: usize,
    message: Vec<u8>,
}

impl SessionState {
    /// Unread bytes of the status message.
    pub fn remaining(&self) -> usize {
        self.message.len() - self.status_cursor
    }
}

/// Guards the single session slot.
#[derive(Debug, Default)]
pub struct SessionManager {
    state: Mutex<SessionState>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the session slot.
    ///
    /// On success the open counter is bumped, a fresh `"Count {n}\n"` status
    /// message is generated and the read cursor rewinds to its start.
    pub fn open(&self) -> Result<StatusMessage> {
        let mut state = self.lock();
        if state.active {
            warn!(open_count = state.open_count, "open rejected: session busy");
            return Err(Error::Busy);
        }

        state.active = true;
        // Counted before formatting: the first open reports "Count 1". The
        // character device printed its pre-increment counter ("Count 0").
        state.open_count += 1;
        let message = StatusMessage::for_open(state.open_count);
        state.message = message.as_bytes().to_vec();
        state.status_cursor = 0;

        info!(open_count = state.open_count, "session opened");
        Ok(message)
    }

    /// Read up to `max_len` bytes of the status message from the cursor.
    ///
    /// An empty result means end-of-data; it is returned for every read once
    /// the cursor has reached the end of the message.
    pub fn read(&self, max_len: usize) -> Vec<u8> {
        let mut state = self.lock();
        let start = state.status_cursor;
        let end = start + max_len.min(state.remaining());
        let chunk = state.message[start..end].to_vec();
        state.status_cursor = end;
        chunk
    }

    /// Free the session slot and drop its status message. Never fails.
    ///
    /// `open_count` survives release.
    pub fn release(&self) {
        let mut state = self.lock();
        if !state.active {
            debug!("release without an active session");
        }
        state.active = false;
        state.message.clear();
        state.status_cursor = 0;
        debug!(open_count = state.open_count, "session released");
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    pub fn open_count(&self) -> u64 {
        self.lock().open_count
    }

    /// Unread bytes of the current status message.
    pub fn remaining(&self) -> usize {
        self.lock().remaining()
    }

    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_then_busy() {
        let manager = SessionManager::new();
        assert!(manager.open().is_ok());
        assert!(matches!(manager.open(), Err(Error::Busy)));
        assert!(manager.is_active());
    }

    #[test]
    fn test_busy_does_not_bump_counter() {
        let manager = SessionManager::new();
        manager.open().unwrap();
        let _ = manager.open();
        assert_eq!(manager.open_count(), 1);
    }

    #[test]
    fn test_open_count_strictly_increases() {
        let manager = SessionManager::new();
        let mut last = manager.open_count();
        for _ in 0..5 {
            manager.open().unwrap();
            assert!(manager.open_count() > last);
            last = manager.open_count();
            manager.release();
        }
        assert_eq!(last, 5);
    }

    #[test]
    fn test_status_message_format() {
        let manager = SessionManager::new();
        assert_eq!(manager.open().unwrap().as_str(), "Count 1\n");
        manager.release();
        assert_eq!(manager.open().unwrap().to_string(), "Count 2\n");
    }

    #[test]
    fn test_read_in_chunks_then_eof() {
        let manager = SessionManager::new();
        manager.open().unwrap();

        assert_eq!(manager.read(3), b"Cou");
        assert_eq!(manager.remaining(), 5);
        assert_eq!(manager.read(3), b"nt ");
        assert_eq!(manager.read(3), b"1\n");
        assert!(manager.read(3).is_empty());
        assert!(manager.read(3).is_empty());
    }

    #[test]
    fn test_read_zero_len() {
        let manager = SessionManager::new();
        manager.open().unwrap();
        assert!(manager.read(0).is_empty());
        assert_eq!(manager.read(100), b"Count 1\n");
    }

    #[test]
    fn test_read_before_open_is_eof() {
        let manager = SessionManager::new();
        assert!(manager.read(16).is_empty());
    }

    #[test]
    fn test_reopen_rewinds_cursor() {
        let manager = SessionManager::new();
        manager.open().unwrap();
        manager.read(100);
        manager.release();

        manager.open().unwrap();
        let snapshot = manager.snapshot();
        assert_eq!(snapshot.status_cursor, 0);
        assert_eq!(manager.read(100), b"Count 2\n");
    }

    #[test]
    fn test_release_resets_status() {
        let manager = SessionManager::new();
        manager.open().unwrap();
        assert_eq!(manager.read(3), b"Cou");
        manager.release();

        assert!(manager.read(100).is_empty());
        let snapshot = manager.snapshot();
        assert_eq!(snapshot.status_cursor, 0);
        assert_eq!(snapshot.remaining(), 0);
        assert_eq!(snapshot.open_count, 1);
    }

    #[test]
    fn test_release_is_unconditional() {
        let manager = SessionManager::new();
        manager.release();
        assert!(!manager.is_active());
        manager.open().unwrap();
        manager.release();
        assert!(!manager.is_active());
        assert!(manager.open().is_ok());
    }
}
