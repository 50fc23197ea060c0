//! Deferred values.
//!
//! An adapted call hands its caller a deferred value and keeps the matching
//! [`Completer`] for itself. Which future type is used is chosen once per
//! adapter through the [`Deferred`] type parameter:
//!
//! - [`OneshotDeferred`] (default): a single consumer awaits the outcome.
//! - [`SharedDeferred`]: cloneable, every clone observes the same outcome.
//!
//! ```rust,ignore
//! let adapter = EventAdapter::<SharedDeferred>::with_deferred();
//! let done = adapter.adapt(&source, "end")?;
//! let watcher = done.clone();
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::Shared;
use tokio::sync::oneshot;

use crate::foundation::error::{EventError, EventResult};
use crate::foundation::payload::Payload;

/// The value an adapted call resolves with.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The success payload, when no aggregation was configured.
    Value(Payload),
    /// The success payload together with every aggregated payload.
    Aggregated {
        value: Payload,
        aggregated: Vec<Payload>,
    },
}

impl Resolution {
    /// Returns the success payload.
    pub fn value(&self) -> &Payload {
        match self {
            Self::Value(value) | Self::Aggregated { value, .. } => value,
        }
    }

    /// Returns the aggregated payloads, if aggregation was configured.
    pub fn aggregated(&self) -> Option<&[Payload]> {
        match self {
            Self::Value(_) => None,
            Self::Aggregated { aggregated, .. } => Some(aggregated),
        }
    }

    /// Consumes the resolution, returning the success payload.
    pub fn into_value(self) -> Payload {
        match self {
            Self::Value(value) | Self::Aggregated { value, .. } => value,
        }
    }
}

/// Final outcome of an adapted call.
pub type AdaptOutcome = EventResult<Resolution>;

/// The producing half of a deferred value.
pub trait Completer: Send + 'static {
    /// Settles the deferred value. Consumes the completer, so it can run once.
    fn complete(self, outcome: AdaptOutcome);
}

/// A future that yields the outcome of an adapted call.
pub trait Deferred: Future<Output = AdaptOutcome> + Send + Sized + 'static {
    /// The producing half stored by the call.
    type Completer: Completer;

    /// Creates a connected (completer, deferred value) pair.
    fn channel() -> (Self::Completer, Self);
}

// =============================================================================
// Oneshot
// =============================================================================

/// Completer backed by a tokio oneshot sender.
#[derive(Debug)]
pub struct OneshotCompleter {
    tx: oneshot::Sender<AdaptOutcome>,
}

impl Completer for OneshotCompleter {
    fn complete(self, outcome: AdaptOutcome) {
        // The receiver is gone when the caller stopped waiting.
        let _ = self.tx.send(outcome);
    }
}

/// Single-consumer deferred value.
///
/// Resolves to [`EventError::Abandoned`] if the completer is dropped without
/// being used.
#[derive(Debug)]
pub struct OneshotDeferred {
    rx: oneshot::Receiver<AdaptOutcome>,
}

impl Deferred for OneshotDeferred {
    type Completer = OneshotCompleter;

    fn channel() -> (Self::Completer, Self) {
        let (tx, rx) = oneshot::channel();
        (OneshotCompleter { tx }, Self { rx })
    }
}

impl Future for OneshotDeferred {
    type Output = AdaptOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(EventError::Abandoned)))
    }
}

// =============================================================================
// Shared
// =============================================================================

/// Cloneable deferred value; all clones observe the same outcome.
#[derive(Clone)]
pub struct SharedDeferred {
    inner: Shared<OneshotDeferred>,
}

impl Deferred for SharedDeferred {
    type Completer = OneshotCompleter;

    fn channel() -> (Self::Completer, Self) {
        let (completer, deferred) = OneshotDeferred::channel();
        (
            completer,
            Self {
                inner: deferred.shared(),
            },
        )
    }
}

impl Future for SharedDeferred {
    type Output = AdaptOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

impl std::fmt::Debug for SharedDeferred {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedDeferred")
            .field("settled", &self.inner.peek().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_oneshot_delivers_outcome() {
        let (completer, deferred) = OneshotDeferred::channel();
        completer.complete(Ok(Resolution::Value(Payload::from("value"))));

        let resolution = deferred.await.unwrap();
        assert_eq!(resolution.value(), &Payload::from("value"));
        assert!(resolution.aggregated().is_none());
    }

    #[tokio::test]
    async fn test_dropped_completer_abandons() {
        let (completer, deferred) = OneshotDeferred::channel();
        drop(completer);

        let err = deferred.await.unwrap_err();
        assert!(err.is_abandoned());
    }

    #[tokio::test]
    async fn test_shared_clones_see_same_outcome() {
        let (completer, deferred) = SharedDeferred::channel();
        let other = deferred.clone();
        completer.complete(Err(EventError::Message("boom".into())));

        assert_eq!(deferred.await.unwrap_err().to_string(), "boom");
        assert_eq!(other.await.unwrap_err().to_string(), "boom");
    }
}
