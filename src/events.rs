//! Lifecycle notifications and the broadcast bus that carries them.

use std::sync::{Arc, Mutex};

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;

use crate::lock_or_recover;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HudEventKind {
    WillAppear,
    DidAppear,
    WillDisappear,
    DidDisappear,
    DidReceiveTouchEvent,
    DidTouchDownInside,
}

/// One notification. `status` is the status text at emit time, if non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HudEvent {
    pub kind: HudEventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl HudEvent {
    pub fn new(kind: HudEventKind, status: Option<&str>) -> Self {
        Self {
            kind,
            status: status.filter(|text| !text.is_empty()).map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receiving end handed to a subscriber. Dropping it also unsubscribes,
/// lazily, on the next publish.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    rx: Receiver<HudEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn receiver(&self) -> &Receiver<HudEvent> {
        &self.rx
    }

    /// Everything published so far, without blocking.
    pub fn drain(&self) -> Vec<HudEvent> {
        self.rx.try_iter().collect()
    }
}

#[derive(Debug, Default)]
struct BusState {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Sender<HudEvent>)>,
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    state: Arc<Mutex<BusState>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = unbounded();
        let mut state = lock_or_recover(&self.state, "event bus subscribe");
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.subscribers.push((id, tx));
        Subscription { id, rx }
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = lock_or_recover(&self.state, "event bus unsubscribe");
        let before = state.subscribers.len();
        state.subscribers.retain(|(existing, _)| *existing != id);
        state.subscribers.len() != before
    }

    pub fn publish(&self, event: HudEvent) {
        tracing::debug!(kind = ?event.kind, "hud event");
        let mut state = lock_or_recover(&self.state, "event bus publish");
        state
            .subscribers
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    /// Public API: live subscribers, after pruning the ones dropped by a
    /// previous publish. Hosts use it to skip building events nobody reads.
    pub fn subscriber_count(&self) -> usize {
        lock_or_recover(&self.state, "event bus count")
            .subscribers
            .len()
    }
}
