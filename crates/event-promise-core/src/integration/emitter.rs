//! Emitter collaborator contract.
//!
//! The adapter never emits and never owns the source. It only needs three
//! capabilities from it: register a persistent listener, register a
//! single-shot listener, and remove a listener by the [`ListenerId`] that
//! registration handed out.

use std::fmt;
use std::sync::Arc;

use crate::foundation::payload::Payload;

/// Identifies one registered listener on one emitter.
///
/// Ids are allocated by the emitter and are only meaningful together with
/// the event name they were registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Wraps a raw id allocated by an emitter implementation.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A callback invoked with every payload of the event it is registered for.
pub type Listener = Arc<dyn Fn(&Payload) + Send + Sync>;

/// A source of named events.
///
/// # Contract
///
/// - Listeners registered with [`once`](Emitter::once) are removed by the
///   emitter before they are invoked, so they run at most once.
/// - Implementations must not hold internal locks while invoking listeners:
///   a listener may call back into [`remove_listener`](Emitter::remove_listener)
///   on the same emitter.
/// - Listeners of one event are invoked in registration order.
///
/// # Example
///
/// ```rust,ignore
/// impl Emitter for MyStream {
///     fn on(&self, event: &str, listener: Listener) -> ListenerId {
///         self.registry.add(event, listener, false)
///     }
///
///     fn once(&self, event: &str, listener: Listener) -> ListenerId {
///         self.registry.add(event, listener, true)
///     }
///
///     fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
///         self.registry.remove(event, id)
///     }
/// }
/// ```
pub trait Emitter: Send + Sync {
    /// Registers a listener that stays attached until removed.
    fn on(&self, event: &str, listener: Listener) -> ListenerId;

    /// Registers a listener that detaches itself after its first invocation.
    fn once(&self, event: &str, listener: Listener) -> ListenerId;

    /// Removes a listener.
    ///
    /// Returns `false` if no listener with that id is attached to `event`,
    /// e.g. because it was a single-shot listener that already fired.
    fn remove_listener(&self, event: &str, id: ListenerId) -> bool;
}
