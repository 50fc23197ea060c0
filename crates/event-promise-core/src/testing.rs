//! In-memory emitter for tests.
//!
//! [`TestEmitter`] follows the usual emitter semantics: listeners run
//! synchronously in registration order, single-shot listeners are removed
//! before they run, and listeners removed during an emission still see that
//! emission.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::foundation::payload::Payload;
use crate::integration::emitter::{Emitter, Listener, ListenerId};

struct Registered {
    id: ListenerId,
    listener: Listener,
    once: bool,
}

/// A synchronous emitter that the test drives by calling [`emit`](Self::emit).
#[derive(Default)]
pub struct TestEmitter {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<String, Vec<Registered>>>,
}

impl TestEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invokes every listener of `event` with `payload`.
    ///
    /// Returns `false` if nothing was listening.
    pub fn emit(&self, event: &str, payload: impl Into<Payload>) -> bool {
        let payload = payload.into();
        let snapshot: Vec<Listener> = {
            let mut listeners = self.listeners.lock();
            let Some(registered) = listeners.get_mut(event) else {
                return false;
            };
            let snapshot = registered.iter().map(|r| r.listener.clone()).collect();
            registered.retain(|r| !r.once);
            snapshot
        };

        for listener in &snapshot {
            listener(&payload);
        }
        !snapshot.is_empty()
    }

    /// Number of listeners attached to `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().get(event).map_or(0, Vec::len)
    }

    /// Number of listeners attached across all events.
    pub fn total_listeners(&self) -> usize {
        self.listeners.lock().values().map(Vec::len).sum()
    }

    fn register(&self, event: &str, listener: Listener, once: bool) -> ListenerId {
        let id = ListenerId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .entry(event.to_string())
            .or_default()
            .push(Registered { id, listener, once });
        id
    }
}

impl Emitter for TestEmitter {
    fn on(&self, event: &str, listener: Listener) -> ListenerId {
        self.register(event, listener, false)
    }

    fn once(&self, event: &str, listener: Listener) -> ListenerId {
        self.register(event, listener, true)
    }

    fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let Some(registered) = listeners.get_mut(event) else {
            return false;
        };
        let before = registered.len();
        registered.retain(|r| r.id != id);
        let removed = registered.len() != before;
        if registered.is_empty() {
            listeners.remove(event);
        }
        removed
    }
}

impl std::fmt::Debug for TestEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestEmitter")
            .field("listeners", &self.total_listeners())
            .finish()
    }
}
