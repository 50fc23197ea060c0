//! Subscription bookkeeping and the settlement state machine.
//!
//! Every listener an adapted call attaches is recorded in a
//! [`SubscriptionLedger`]. The ledger is torn down in one place, during the
//! single `Pending -> Settling` transition of [`CallState`], so that no
//! listener outlives settlement regardless of which event settled the call.

use tracing::trace;

use crate::foundation::payload::Payload;
use crate::integration::emitter::{Emitter, ListenerId};

/// One listener attached to a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    event: String,
    id: ListenerId,
}

impl Subscription {
    pub fn new(event: impl Into<String>, id: ListenerId) -> Self {
        Self {
            event: event.into(),
            id,
        }
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Removes the listener from `source`.
    ///
    /// Returns `false` if it was no longer attached (a fired single-shot listener).
    pub fn detach<E: Emitter + ?Sized>(&self, source: &E) -> bool {
        source.remove_listener(&self.event, self.id)
    }
}

/// The set of listeners a call currently has attached.
#[derive(Debug, Default)]
pub struct SubscriptionLedger {
    active: Vec<Subscription>,
}

impl SubscriptionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, subscription: Subscription) {
        self.active.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.active.iter()
    }

    /// Detaches every recorded listener, returning how many were still attached.
    pub fn teardown<E: Emitter + ?Sized>(self, source: &E) -> usize {
        self.active
            .iter()
            .filter(|subscription| {
                let detached = subscription.detach(source);
                trace!(
                    event = subscription.event(),
                    id = %subscription.id(),
                    detached,
                    "Listener torn down"
                );
                detached
            })
            .count()
    }
}

// =============================================================================
// State Machine
// =============================================================================

/// Lifecycle of one adapted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// Listening; any trigger may settle the call.
    Pending,
    /// A trigger won; listeners are being torn down.
    Settling,
    /// The outcome has been handed to the completer.
    Settled,
}

/// Everything taken out of a call by the winning trigger.
#[derive(Debug)]
pub(crate) struct Settlement<C> {
    pub(crate) completer: Option<C>,
    pub(crate) ledger: SubscriptionLedger,
    pub(crate) aggregated: Option<Vec<Payload>>,
}

/// Mutable state of one adapted call, guarded by the binding's mutex.
#[derive(Debug)]
pub(crate) struct CallRecord<C> {
    state: CallState,
    completer: Option<C>,
    ledger: SubscriptionLedger,
    aggregated: Option<Vec<Payload>>,
}

impl<C> CallRecord<C> {
    pub(crate) fn new(aggregating: bool) -> Self {
        Self {
            state: CallState::Pending,
            completer: None,
            ledger: SubscriptionLedger::new(),
            aggregated: aggregating.then(Vec::new),
        }
    }

    pub(crate) fn state(&self) -> CallState {
        self.state
    }

    pub(crate) fn install(&mut self, completer: C) {
        self.completer = Some(completer);
    }

    /// Records a subscription while pending.
    ///
    /// Hands it back when the call already left `Pending`; the caller must
    /// then detach it itself.
    pub(crate) fn record(&mut self, subscription: Subscription) -> Option<Subscription> {
        if self.state == CallState::Pending {
            self.ledger.record(subscription);
            None
        } else {
            Some(subscription)
        }
    }

    /// Appends to the aggregation buffer. Ignored once the call left `Pending`.
    pub(crate) fn push_aggregated(&mut self, payload: &Payload) -> bool {
        match (self.state, self.aggregated.as_mut()) {
            (CallState::Pending, Some(buffer)) => {
                buffer.push(payload.clone());
                true
            }
            _ => false,
        }
    }

    /// The single `Pending -> Settling` transition.
    ///
    /// Returns `None` for every trigger after the first.
    pub(crate) fn begin_settlement(&mut self) -> Option<Settlement<C>> {
        if self.state != CallState::Pending {
            return None;
        }
        self.state = CallState::Settling;
        Some(Settlement {
            completer: self.completer.take(),
            ledger: std::mem::take(&mut self.ledger),
            aggregated: self.aggregated.take(),
        })
    }

    pub(crate) fn finish(&mut self) {
        self.state = CallState::Settled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEmitter;
    use std::sync::Arc;

    #[test]
    fn test_teardown_detaches_each_listener_once() {
        let source = TestEmitter::new();
        let mut ledger = SubscriptionLedger::new();
        let id = source.on("data", Arc::new(|_: &Payload| {}));
        ledger.record(Subscription::new("data", id));
        let id = source.once("end", Arc::new(|_: &Payload| {}));
        ledger.record(Subscription::new("end", id));

        source.emit("end", "done");
        assert_eq!(ledger.len(), 2);

        // The fired single-shot listener is already gone.
        assert_eq!(ledger.teardown(&source), 1);
        assert_eq!(source.total_listeners(), 0);
    }

    #[test]
    fn test_only_first_trigger_settles() {
        let mut record = CallRecord::<()>::new(true);
        record.install(());
        assert!(record.push_aggregated(&Payload::from(1)));

        let settlement = record.begin_settlement().expect("first trigger wins");
        assert_eq!(settlement.aggregated, Some(vec![Payload::from(1)]));
        assert!(settlement.completer.is_some());
        assert_eq!(record.state(), CallState::Settling);

        assert!(record.begin_settlement().is_none());
        assert!(!record.push_aggregated(&Payload::from(2)));

        record.finish();
        assert_eq!(record.state(), CallState::Settled);
        assert!(record.begin_settlement().is_none());
    }

    #[test]
    fn test_record_after_settlement_is_handed_back() {
        let mut record = CallRecord::<()>::new(false);
        assert!(record.record(Subscription::new("end", ListenerId::new(1))).is_none());

        let settlement = record.begin_settlement().unwrap();
        assert_eq!(settlement.ledger.len(), 1);

        let late = record.record(Subscription::new("error", ListenerId::new(2)));
        assert_eq!(late.map(|s| s.id()), Some(ListenerId::new(2)));
    }
}
