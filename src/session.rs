//! The session seam: where the current actor id comes from.
//!
//! The policy reads the authenticated actor's id out of an ambient session
//! keyed by a dot-path like `Auth.User.id`. The session is an explicitly
//! passed capability rather than a global, so tests and non-web hosts swap
//! in [`MemorySession`] without mocking framework internals. Any failure
//! while interrogating the session collapses to "no actor id" inside the
//! policy; nothing here may block a save.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use serde_json::Value;

/// Session state as seen by the stamping policy.
///
/// Implementations must be safe to share across concurrent save operations;
/// the policy itself holds no locks.
pub trait ActorSession: Send + Sync {
    /// Whether the session has been started.
    fn started(&self) -> bool;

    /// Best-effort start. The policy swallows errors from this call and
    /// treats them as "no actor is known".
    fn start(&self) -> Result<()>;

    /// Read the value stored under the dot-path `key`, if any.
    fn read(&self, key: &str) -> Option<String>;
}

/// In-memory [`ActorSession`] over a JSON value tree.
///
/// Dot-path keys walk the tree: `"Auth.User.id"` reads
/// `{"Auth": {"User": {"id": ...}}}`. Reference implementation for tests and
/// for hosts without an HTTP session store.
#[derive(Debug)]
pub struct MemorySession {
    started: AtomicBool,
    data: Value,
}

impl MemorySession {
    /// An already-started session over `data`.
    pub fn started_with(data: Value) -> Self {
        MemorySession {
            started: AtomicBool::new(true),
            data,
        }
    }

    /// A session that has not been started yet. [`ActorSession::start`]
    /// flips it to started.
    pub fn unstarted(data: Value) -> Self {
        MemorySession {
            started: AtomicBool::new(false),
            data,
        }
    }

    /// A started session with nothing in it (no authenticated actor).
    pub fn empty() -> Self {
        MemorySession::started_with(Value::Null)
    }
}

impl ActorSession for MemorySession {
    fn started(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }

    fn start(&self) -> Result<()> {
        self.started.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn read(&self, key: &str) -> Option<String> {
        if !self.started() {
            return None;
        }

        let mut node = &self.data;
        for part in key.split('.') {
            node = node.get(part)?;
        }

        match node {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
