//! The event adapter.
//!
//! [`EventAdapter::adapt`] attaches listeners to an [`Emitter`] and returns a
//! deferred value that settles with the first terminal event:
//!
//! ```text
//!             ┌──────────── aggregate event ──▶ buffer
//!             │
//! Emitter ────┼──────────── success event ────┐
//!             │                               ├──▶ settle ──▶ teardown ──▶ complete
//!             ├──────────── reserved error ───┤
//!             └──────────── custom error ─────┘
//! ```
//!
//! Settling is a single transition guarded by the call's state machine; the
//! losing triggers find the call no longer pending and are ignored.

use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{Level, debug, span, trace, warn};

use crate::foundation::error::{AdaptResult, EventError};
use crate::foundation::payload::Payload;
use crate::framework::config::{AdaptConfig, AdapterSettings};
use crate::framework::deferred::{
    AdaptOutcome, Completer, Deferred, OneshotDeferred, Resolution,
};
use crate::framework::ledger::{CallRecord, Subscription};
use crate::integration::emitter::{Emitter, Listener};

/// Turns emitter events into deferred values.
///
/// The deferred value implementation is fixed per adapter by the `D` type
/// parameter; [`OneshotDeferred`] is used unless another one is chosen.
///
/// # Example
///
/// ```rust,ignore
/// use event_promise_core::{AdaptConfig, EventAdapter, Resolution};
///
/// let adapter = EventAdapter::new();
/// let done = adapter.adapt(&stream, AdaptConfig::new("end").aggregate("data"))?;
///
/// // ... the stream emits some `data` events, then `end` ...
///
/// if let Resolution::Aggregated { value, aggregated } = done.await? {
///     println!("{value:?} after {} chunks", aggregated.len());
/// }
/// ```
pub struct EventAdapter<D: Deferred = OneshotDeferred> {
    settings: AdapterSettings,
    _deferred: PhantomData<fn() -> D>,
}

impl EventAdapter<OneshotDeferred> {
    /// Creates an adapter using the default deferred value implementation.
    pub fn new() -> Self {
        Self::with_deferred()
    }
}

impl Default for EventAdapter<OneshotDeferred> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Deferred> Clone for EventAdapter<D> {
    fn clone(&self) -> Self {
        Self {
            settings: self.settings.clone(),
            _deferred: PhantomData,
        }
    }
}

impl<D: Deferred> std::fmt::Debug for EventAdapter<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventAdapter")
            .field("settings", &self.settings)
            .field("deferred", &std::any::type_name::<D>())
            .finish()
    }
}

impl<D: Deferred> EventAdapter<D> {
    /// Creates an adapter producing `D` deferred values.
    pub fn with_deferred() -> Self {
        Self {
            settings: AdapterSettings::default(),
            _deferred: PhantomData,
        }
    }

    /// Replaces the adapter settings (builder pattern).
    pub fn settings(mut self, settings: AdapterSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the adapter settings.
    pub fn get_settings(&self) -> &AdapterSettings {
        &self.settings
    }

    /// Adapts the next terminal event of `source` into a deferred value.
    ///
    /// `config` is an [`AdaptConfig`] or a bare success event name.
    ///
    /// # Errors
    ///
    /// Returns an error, without attaching any listener, if the configuration
    /// is invalid (e.g. an empty event name).
    pub fn adapt<E>(&self, source: &Arc<E>, config: impl Into<AdaptConfig>) -> AdaptResult<D>
    where
        E: Emitter + ?Sized + 'static,
    {
        let config = config.into();
        config.validate()?;

        let span = span!(Level::DEBUG, "adapt", event_name = %config.event_name());
        let _enter = span.enter();

        let binding = Arc::new(Binding::<E, D::Completer> {
            source: Arc::downgrade(source),
            record: Mutex::new(CallRecord::new(config.aggregate_event().is_some())),
            log_payloads: self.settings.log_payloads,
            config,
        });

        if let Some(aggregate) = binding.config.aggregate_event() {
            let listener: Listener = {
                let binding = Arc::clone(&binding);
                Arc::new(move |payload: &Payload| binding.on_aggregate(payload))
            };
            let id = source.on(aggregate, listener);
            binding.track(source.as_ref(), Subscription::new(aggregate, id));
        }

        let (completer, deferred) = D::channel();
        binding.record.lock().install(completer);

        let event_name = binding.config.event_name();
        let listener: Listener = {
            let binding = Arc::clone(&binding);
            Arc::new(move |payload: &Payload| binding.on_success(payload))
        };
        let id = if binding.config.has_filter() {
            source.on(event_name, listener)
        } else {
            source.once(event_name, listener)
        };
        binding.track(source.as_ref(), Subscription::new(event_name, id));

        let error_event = self.settings.error_event.as_str();
        let listener: Listener = {
            let binding = Arc::clone(&binding);
            Arc::new(move |payload: &Payload| binding.on_reserved_error(payload))
        };
        let id = source.once(error_event, listener);
        binding.track(source.as_ref(), Subscription::new(error_event, id));

        if let Some(custom) = binding.config.error_event() {
            let listener: Listener = {
                let binding = Arc::clone(&binding);
                Arc::new(move |payload: &Payload| binding.on_custom_error(payload))
            };
            let id = source.once(custom, listener);
            binding.track(source.as_ref(), Subscription::new(custom, id));
        }

        debug!(
            aggregate = binding.config.aggregate_event(),
            error_name = binding.config.error_event(),
            filtered = binding.config.has_filter(),
            ignore_errors = binding.config.ignores_errors(),
            "Awaiting terminal event"
        );

        Ok(deferred)
    }
}

/// What settled a call.
enum Trigger {
    Success(Payload),
    Failure(Payload),
}

/// Shared state of one adapted call, captured by all of its listeners.
///
/// Holds the source weakly: the source owns the listeners, and the listeners
/// own the binding.
struct Binding<E: ?Sized, C> {
    source: Weak<E>,
    record: Mutex<CallRecord<C>>,
    config: AdaptConfig,
    log_payloads: bool,
}

impl<E, C> Binding<E, C>
where
    E: Emitter + ?Sized,
    C: Completer,
{
    /// Records a freshly attached listener, or detaches it right away if the
    /// call settled while it was being attached.
    fn track(&self, source: &E, subscription: Subscription) {
        let late = self.record.lock().record(subscription);
        if let Some(subscription) = late {
            trace!(
                event = subscription.event(),
                "Call settled during setup, detaching listener"
            );
            subscription.detach(source);
        }
    }

    fn on_aggregate(&self, payload: &Payload) {
        let mut record = self.record.lock();
        if record.push_aggregated(payload) {
            drop(record);
            self.log_payload("Aggregated payload", payload);
        } else {
            trace!(state = ?record.state(), "Aggregate event ignored");
        }
    }

    fn on_success(&self, payload: &Payload) {
        if !self.config.accepts(payload) {
            self.log_payload("Success event rejected by filter", payload);
            return;
        }
        self.settle(Trigger::Success(payload.clone()));
    }

    fn on_reserved_error(&self, payload: &Payload) {
        if self.config.ignores_errors() {
            self.log_payload("Reserved error event ignored", payload);
            return;
        }
        self.settle(Trigger::Failure(payload.clone()));
    }

    fn on_custom_error(&self, payload: &Payload) {
        self.settle(Trigger::Failure(payload.clone()));
    }

    /// The single settlement point.
    fn settle(&self, trigger: Trigger) {
        let Some(settlement) = self.record.lock().begin_settlement() else {
            trace!("Call already settled, trigger ignored");
            return;
        };

        match self.source.upgrade() {
            Some(source) => {
                let detached = settlement.ledger.teardown(source.as_ref());
                trace!(detached, "Listeners torn down");
            }
            None => warn!("Event source dropped before listener teardown"),
        }
        self.record.lock().finish();

        let outcome: AdaptOutcome = match trigger {
            Trigger::Success(value) => {
                debug!(kind = value.kind(), "Call resolved");
                Ok(match settlement.aggregated {
                    Some(aggregated) => Resolution::Aggregated { value, aggregated },
                    None => Resolution::Value(value),
                })
            }
            Trigger::Failure(payload) => {
                let err = EventError::from(payload);
                debug!(error = %err, "Call rejected");
                Err(err)
            }
        };

        match settlement.completer {
            Some(completer) => completer.complete(outcome),
            None => warn!("Call settled before its deferred value was created"),
        }
    }

    fn log_payload(&self, message: &'static str, payload: &Payload) {
        if self.log_payloads {
            trace!(kind = payload.kind(), payload = ?payload, "{message}");
        } else {
            trace!(kind = payload.kind(), "{message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::deferred::SharedDeferred;
    use crate::testing::TestEmitter;
    use futures::FutureExt;
    use serde_json::json;

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct ResetError;

    fn settled<D: Deferred + Unpin>(deferred: &mut D) -> Option<AdaptOutcome> {
        deferred.now_or_never()
    }

    #[test]
    fn test_bare_name_resolves_with_payload() {
        let source = Arc::new(TestEmitter::new());
        let mut done = EventAdapter::new().adapt(&source, "end").unwrap();

        assert!(settled(&mut done).is_none());
        source.emit("end", "value");

        let resolution = settled(&mut done).unwrap().unwrap();
        assert_eq!(resolution, Resolution::Value(Payload::from("value")));
        assert_eq!(source.total_listeners(), 0);
    }

    #[test]
    fn test_aggregates_in_order() {
        let source = Arc::new(TestEmitter::new());
        let mut done = EventAdapter::new()
            .adapt(&source, AdaptConfig::new("end").aggregate("data"))
            .unwrap();

        for i in 0..5 {
            source.emit("data", i);
        }
        source.emit("end", "done");
        source.emit("data", 99);

        let resolution = settled(&mut done).unwrap().unwrap();
        assert_eq!(resolution.value(), &Payload::from("done"));
        let expected: Vec<Payload> = (0..5).map(Payload::from).collect();
        assert_eq!(resolution.aggregated(), Some(expected.as_slice()));
        assert_eq!(source.total_listeners(), 0);
    }

    #[test]
    fn test_filter_waits_for_qualifying_payload() {
        let source = Arc::new(TestEmitter::new());
        let mut done = EventAdapter::new()
            .adapt(
                &source,
                AdaptConfig::new("data").filter(|p| p.as_i64() == Some(4)),
            )
            .unwrap();

        for i in 0..4 {
            source.emit("data", i);
            assert!(settled(&mut done).is_none());
            assert_eq!(source.listener_count("data"), 1);
        }
        source.emit("data", 4);

        let resolution = settled(&mut done).unwrap().unwrap();
        assert_eq!(resolution, Resolution::Value(Payload::from(4)));
        assert_eq!(source.total_listeners(), 0);
    }

    #[test]
    fn test_filter_with_aggregate_on_same_event_includes_winner() {
        let source = Arc::new(TestEmitter::new());
        let mut done = EventAdapter::new()
            .adapt(
                &source,
                AdaptConfig::new("data")
                    .aggregate("data")
                    .filter(|p| p.as_i64() == Some(2)),
            )
            .unwrap();

        for i in 0..4 {
            source.emit("data", i);
        }

        let resolution = settled(&mut done).unwrap().unwrap();
        let expected: Vec<Payload> = (0..3).map(Payload::from).collect();
        assert_eq!(resolution.aggregated(), Some(expected.as_slice()));
    }

    #[test]
    fn test_reserved_error_rejects_with_same_instance() {
        let source = Arc::new(TestEmitter::new());
        let mut done = EventAdapter::new()
            .adapt(&source, AdaptConfig::new("end").aggregate("data"))
            .unwrap();

        let err = Payload::error(ResetError);
        source.emit("error", err.clone());

        let rejection = settled(&mut done).unwrap().unwrap_err();
        assert_eq!(Payload::from(Arc::clone(rejection.native().unwrap())), err);
        assert_eq!(source.total_listeners(), 0);
    }

    #[test]
    fn test_opaque_error_keeps_payload() {
        let source = Arc::new(TestEmitter::new());
        let mut done = EventAdapter::new()
            .adapt(&source, AdaptConfig::new("end").error_name("error2"))
            .unwrap();

        source.emit("error2", json!({"boop": true}));

        let rejection = settled(&mut done).unwrap().unwrap_err();
        assert_eq!(rejection.event().unwrap()["boop"], json!(true));
        assert_eq!(source.total_listeners(), 0);
    }

    #[test]
    fn test_reserved_error_string_becomes_message() {
        let source = Arc::new(TestEmitter::new());
        let mut done = EventAdapter::new().adapt(&source, "end").unwrap();

        source.emit("error", "boom");

        let rejection = settled(&mut done).unwrap().unwrap_err();
        assert!(matches!(rejection, EventError::Message(ref m) if m == "boom"));
        assert_eq!(rejection.to_string(), "boom");
        assert_eq!(source.total_listeners(), 0);
    }

    #[test]
    fn test_reserved_error_object_keeps_payload() {
        let source = Arc::new(TestEmitter::new());
        let mut done = EventAdapter::new().adapt(&source, "end").unwrap();

        source.emit("error", json!({"boop": true}));

        let rejection = settled(&mut done).unwrap().unwrap_err();
        assert_eq!(rejection.event(), Some(&json!({"boop": true})));
        assert_eq!(rejection.to_string(), crate::OPAQUE_ERROR_MESSAGE);
        assert_eq!(source.total_listeners(), 0);
    }

    #[test]
    fn test_ignore_errors_keeps_listening() {
        let source = Arc::new(TestEmitter::new());
        let mut done = EventAdapter::new()
            .adapt(&source, AdaptConfig::new("end").ignore_errors(true))
            .unwrap();

        source.emit("error", "boom");
        assert!(settled(&mut done).is_none());

        source.emit("end", "value");
        let resolution = settled(&mut done).unwrap().unwrap();
        assert_eq!(resolution.into_value(), Payload::from("value"));
        assert_eq!(source.total_listeners(), 0);
    }

    #[test]
    fn test_ignore_errors_does_not_mute_custom_error() {
        let source = Arc::new(TestEmitter::new());
        let mut done = EventAdapter::new()
            .adapt(
                &source,
                AdaptConfig::new("end").error_name("abort").ignore_errors(true),
            )
            .unwrap();

        source.emit("abort", "stopped");
        let rejection = settled(&mut done).unwrap().unwrap_err();
        assert_eq!(rejection.to_string(), "stopped");
    }

    #[test]
    fn test_first_error_wins() {
        let source = Arc::new(TestEmitter::new());
        let mut done = EventAdapter::new()
            .adapt(&source, AdaptConfig::new("end").error_name("abort"))
            .unwrap();

        source.emit("abort", "first");
        assert!(!source.emit("error", "second"));
        assert!(!source.emit("end", "late"));

        let rejection = settled(&mut done).unwrap().unwrap_err();
        assert_eq!(rejection.to_string(), "first");
    }

    #[test]
    fn test_custom_reserved_error_event() {
        let source = Arc::new(TestEmitter::new());
        let adapter = EventAdapter::new().settings(AdapterSettings {
            error_event: "failure".into(),
            log_payloads: true,
        });
        let mut done = adapter.adapt(&source, "end").unwrap();

        assert!(!source.emit("error", "ignored"));
        source.emit("failure", "broken");

        let rejection = settled(&mut done).unwrap().unwrap_err();
        assert_eq!(rejection.to_string(), "broken");
    }

    #[test]
    fn test_empty_name_is_rejected_synchronously() {
        let source = Arc::new(TestEmitter::new());
        let result = EventAdapter::new().adapt(&source, AdaptConfig::new("").error_name("end"));

        assert!(matches!(result, Err(crate::AdaptError::EmptyEventName)));
        assert_eq!(source.total_listeners(), 0);
    }

    #[test]
    fn test_dropped_source_abandons_call() {
        let source = Arc::new(TestEmitter::new());
        let mut done = EventAdapter::new()
            .adapt(&source, AdaptConfig::new("end").aggregate("data"))
            .unwrap();

        drop(source);

        let rejection = settled(&mut done).unwrap().unwrap_err();
        assert!(rejection.is_abandoned());
    }

    #[test]
    fn test_works_through_trait_object() {
        let source = Arc::new(TestEmitter::new());
        let dynamic: Arc<dyn Emitter> = source.clone();
        let mut done = EventAdapter::new().adapt(&dynamic, "end").unwrap();

        source.emit("end", true);
        assert_eq!(
            settled(&mut done).unwrap().unwrap().into_value(),
            Payload::from(true)
        );
        assert_eq!(source.total_listeners(), 0);
    }

    #[test]
    fn test_settlement_during_setup_detaches_late_listeners() {
        // Emits the success event as soon as its listener is attached, before
        // the adapter has attached the error listeners.
        struct EagerEmitter {
            inner: TestEmitter,
        }

        impl Emitter for EagerEmitter {
            fn on(&self, event: &str, listener: Listener) -> crate::ListenerId {
                self.inner.on(event, listener)
            }

            fn once(&self, event: &str, listener: Listener) -> crate::ListenerId {
                let id = self.inner.once(event, listener);
                if event == "end" {
                    self.inner.emit("end", "early");
                }
                id
            }

            fn remove_listener(&self, event: &str, id: crate::ListenerId) -> bool {
                self.inner.remove_listener(event, id)
            }
        }

        let source = Arc::new(EagerEmitter {
            inner: TestEmitter::new(),
        });
        let mut done = EventAdapter::new()
            .adapt(&source, AdaptConfig::new("end").error_name("abort"))
            .unwrap();

        let resolution = settled(&mut done).unwrap().unwrap();
        assert_eq!(resolution.into_value(), Payload::from("early"));
        assert_eq!(source.inner.total_listeners(), 0);
    }

    #[tokio::test]
    async fn test_shared_deferred_is_returned() {
        let source = Arc::new(TestEmitter::new());
        let adapter = EventAdapter::<SharedDeferred>::with_deferred();
        let done: SharedDeferred = adapter.adapt(&source, "end").unwrap();
        let watcher = done.clone();

        source.emit("end", "value");

        assert_eq!(done.await.unwrap().into_value(), Payload::from("value"));
        assert_eq!(watcher.await.unwrap().into_value(), Payload::from("value"));
    }
}
