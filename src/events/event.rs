//! # Diagnostic events emitted by an eventbox.
//!
//! The [`EventKind`] enum classifies what happened:
//! - **Registry events**: subscriptions added/removed, full reset
//! - **Dispatch events**: publishes, default emitter changes
//! - **Failure events**: handler errors and panics caught during emission
//!
//! The [`Event`] struct carries the metadata: timestamp, topic, token,
//! handler name, reason and a count.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use eventbox::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::HandlerFailed)
//!     .with_topic("orders")
//!     .with_handler("audit")
//!     .with_reason("db down");
//!
//! assert_eq!(ev.kind, EventKind::HandlerFailed);
//! assert_eq!(ev.topic.as_deref(), Some("orders"));
//! assert_eq!(ev.reason.as_deref(), Some("db down"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::topics::Token;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of diagnostic events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registry events ===
    /// A handler was subscribed.
    ///
    /// Sets:
    /// - `topic`: topic name
    /// - `token`: issued token
    /// - `handler`: handler name
    Subscribed,

    /// One or more subscriptions were removed.
    ///
    /// Sets:
    /// - `topic`: topic name
    /// - `count`: number of subscriptions removed (never 0)
    Unsubscribed,

    /// Every topic and subscription was cleared.
    ///
    /// Sets:
    /// - `count`: number of subscriptions removed
    Reset,

    // === Dispatch events ===
    /// A topic was published.
    ///
    /// Sets:
    /// - `topic`: topic name
    /// - `count`: number of emissions handed to the emitter (may be 0)
    Published,

    /// The default emitter was replaced or restored.
    ///
    /// Sets:
    /// - `reason`: `"custom"` or `"default"`
    EmitterChanged,

    // === Failure events ===
    /// A handler returned an error.
    ///
    /// Sets:
    /// - `topic`, `token`, `handler`
    /// - `reason`: error message
    HandlerFailed,

    /// A handler panicked; the panic was caught.
    ///
    /// Sets:
    /// - `topic`, `token`, `handler`
    /// - `reason`: panic info
    HandlerPanicked,
}

/// Diagnostic event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Topic name, if applicable.
    pub topic: Option<Arc<str>>,
    /// Subscription token, if applicable.
    pub token: Option<Token>,
    /// Handler name, if applicable.
    pub handler: Option<Arc<str>>,
    /// Human-readable reason (errors, panic info, emitter kind).
    pub reason: Option<Arc<str>>,
    /// Count of affected subscriptions or emissions.
    pub count: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            topic: None,
            token: None,
            handler: None,
            reason: None,
            count: None,
        }
    }

    /// Attaches a topic name.
    #[inline]
    pub fn with_topic(mut self, topic: impl Into<Arc<str>>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Attaches a subscription token.
    #[inline]
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    /// Attaches a handler name.
    #[inline]
    pub fn with_handler(mut self, handler: impl Into<Arc<str>>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a count.
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(n);
        self
    }

    /// True for [`EventKind::HandlerFailed`] and [`EventKind::HandlerPanicked`].
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            EventKind::HandlerFailed | EventKind::HandlerPanicked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::Published);
        let b = Event::new(EventKind::Published);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_failure_kinds() {
        assert!(Event::new(EventKind::HandlerFailed).is_failure());
        assert!(Event::new(EventKind::HandlerPanicked).is_failure());
        assert!(!Event::new(EventKind::Subscribed).is_failure());
    }

    #[test]
    fn test_builders_fill_fields() {
        let ev = Event::new(EventKind::Unsubscribed)
            .with_topic("news")
            .with_count(2);
        assert_eq!(ev.topic.as_deref(), Some("news"));
        assert_eq!(ev.count, Some(2));
        assert!(ev.token.is_none());
        assert!(ev.handler.is_none());
    }
}
