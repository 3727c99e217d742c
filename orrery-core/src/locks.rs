//! Per-conversation processing locks.
//!
//! The effect processor must never drain the same conversation's queue
//! concurrently. Each conversation gets an async mutex handed out from a
//! shared registry; the registry itself is guarded by a short-lived
//! synchronous lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::ConversationId;

/// Registry of per-conversation async locks.
#[derive(Default)]
pub struct ConversationLocks {
    inner: Mutex<HashMap<ConversationId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ConversationLocks {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (or create) the lock for a conversation.
    #[must_use]
    pub fn acquire(&self, id: ConversationId) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(self.inner.lock().entry(id).or_default())
    }

    /// Drop the lock entry for a finished conversation.
    pub fn release(&self, id: ConversationId) {
        self.inner.lock().remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_conversation_shares_a_lock() {
        let locks = ConversationLocks::new();
        let id = ConversationId::new();
        let a = locks.acquire(id);
        let b = locks.acquire(id);
        assert!(Arc::ptr_eq(&a, &b));
        let guard = a.lock().await;
        assert!(b.try_lock().is_err());
        drop(guard);
        assert!(b.try_lock().is_ok());
    }

    #[test]
    fn released_conversations_get_fresh_locks() {
        let locks = ConversationLocks::new();
        let id = ConversationId::new();
        let a = locks.acquire(id);
        locks.release(id);
        let b = locks.acquire(id);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_conversations_get_different_locks() {
        let locks = ConversationLocks::new();
        let a = locks.acquire(ConversationId::new());
        let b = locks.acquire(ConversationId::new());
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
