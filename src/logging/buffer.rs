//! In-memory session buffer
//!
//! Accumulates every line routed to the session destination for the lifetime
//! of the dispatcher. Nothing is ever evicted.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe, append-only list of rendered lines
#[derive(Debug, Default)]
pub struct SessionBuffer {
    entries: RwLock<Vec<String>>,
}

impl SessionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic elsewhere while holding the lock must not lose lines
    fn read(&self) -> RwLockReadGuard<'_, Vec<String>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<String>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a rendered line exactly as given (line breaks included)
    pub fn push(&self, rendered: String) {
        self.write().push(rendered);
    }

    /// All entries concatenated in append order
    pub fn snapshot(&self) -> String {
        self.read().concat()
    }

    /// Copy of the individual entries
    pub fn entries(&self) -> Vec<String> {
        self.read().clone()
    }

    /// Number of entries appended so far
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
