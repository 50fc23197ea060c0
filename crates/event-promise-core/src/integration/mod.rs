//! Integration layer - the contract required of external event sources.

pub mod emitter;

pub use emitter::{Emitter, Listener, ListenerId};
