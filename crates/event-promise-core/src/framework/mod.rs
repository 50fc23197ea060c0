//! Framework layer - the adapter and its building blocks.
//!
//! - [`EventAdapter`]: attaches listeners and hands out deferred values
//! - [`AdaptConfig`]: per-call configuration
//! - [`Deferred`]: pluggable deferred value implementations
//! - [`SubscriptionLedger`]: listener bookkeeping and the settlement state machine

pub mod adapter;
pub mod config;
pub mod deferred;
pub mod ledger;

pub use adapter::EventAdapter;
pub use config::{AdaptConfig, AdapterSettings, DEFAULT_ERROR_EVENT, FilterFn};
pub use deferred::{
    AdaptOutcome, Completer, Deferred, OneshotCompleter, OneshotDeferred, Resolution,
    SharedDeferred,
};
pub use ledger::{CallState, Subscription, SubscriptionLedger};
