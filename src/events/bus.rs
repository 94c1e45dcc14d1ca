//! # Bus for broadcasting diagnostic events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking publishing from the registry, the dispatcher and emissions.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                  Receivers (any):
//!   Registry  ──┐
//!   Eventbox  ──┼──────► Bus ───────► Eventbox::diagnostics() ──► LogWriter / tests / metrics
//!   Emission  ──┘  (broadcast chan)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and needs no runtime.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for diagnostic events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn test_publish_without_receivers_is_silent() {
        let bus = Bus::new(4);
        bus.publish(Event::new(EventKind::Reset));
    }

    #[test]
    fn test_receivers_see_later_events_only() {
        let bus = Bus::new(4);
        bus.publish(Event::new(EventKind::Reset));
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::EmitterChanged));

        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::EmitterChanged);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let bus = Bus::new(0);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::Reset));
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::Reset);
    }
}
