//! # Subscription registry.
//!
//! Maps each [`Topic`] to the handlers subscribed to it, keyed by [`Token`]:
//!
//! ```text
//! HashMap<Topic, BTreeMap<Token, HandlerRef<T>>>
//!   "orders" ─► { #1 ─► audit, #4 ─► mailer, #7 ─► audit }
//!   "users"  ─► { #2 ─► welcome }
//! ```
//!
//! ## Rules
//! - Tokens are monotonic, so `BTreeMap` iteration order is subscription order.
//! - A topic whose last subscription is removed is dropped from the map;
//!   absent and empty topics are indistinguishable to callers.
//! - Removal never fails: unknown topics, tokens and handlers remove nothing.
//! - [`Registry::snapshot`] copies the handler list, so a fan-out in progress
//!   is never affected by later `add`/`remove`/`clear` calls (including calls
//!   made from inside handlers).
//! - The lock is held only for the map operation itself; diagnostics and logs
//!   are emitted after it is released.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::EventboxError;
use crate::events::{Bus, Event, EventKind};
use crate::handlers::{same_handler, HandlerRef};
use crate::topics::{Selector, Token, TokenSource, Topic};

type Subscriptions<T> = BTreeMap<Token, HandlerRef<T>>;

/// Topic → subscriptions store.
pub struct Registry<T> {
    topics: Mutex<HashMap<Topic, Subscriptions<T>>>,
    tokens: TokenSource,
    max_handlers: Option<usize>,
    bus: Bus,
}

impl<T> Registry<T>
where
    T: Send + Sync + 'static,
{
    /// Creates an empty registry reporting to `bus`.
    pub fn new(bus: Bus, max_handlers: Option<usize>) -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
            tokens: TokenSource::new(),
            max_handlers,
            bus,
        }
    }

    /// Subscribes `handler` to `topic` and returns a fresh token.
    ///
    /// The same handler may be added any number of times; each add is an
    /// independent subscription with its own token.
    pub fn add(&self, topic: &Topic, handler: HandlerRef<T>) -> Result<Token, EventboxError> {
        let token = {
            let mut topics = self.lock();
            if let Some(max) = self.max_handlers {
                if topics.get(topic).map_or(0, BTreeMap::len) >= max {
                    return Err(EventboxError::TooManyHandlers {
                        topic: topic.to_string(),
                        max,
                    });
                }
            }
            let token = self.tokens.next();
            topics
                .entry(topic.clone())
                .or_default()
                .insert(token, Arc::clone(&handler));
            token
        };

        self.report_added(topic, token, &handler);
        Ok(token)
    }

    /// Subscribes every `(topic, handler)` pair, or none of them.
    ///
    /// The handler cap is checked for the whole batch before anything is inserted.
    pub fn add_all(
        &self,
        entries: Vec<(Topic, HandlerRef<T>)>,
    ) -> Result<Vec<(Topic, Token)>, EventboxError> {
        let mut issued = Vec::with_capacity(entries.len());
        {
            let mut topics = self.lock();

            if let Some(max) = self.max_handlers {
                let mut wanted: HashMap<&Topic, usize> = HashMap::new();
                for (topic, _) in &entries {
                    *wanted.entry(topic).or_insert(0) += 1;
                }
                for (topic, extra) in wanted {
                    let have = topics.get(topic).map_or(0, BTreeMap::len);
                    if have + extra > max {
                        return Err(EventboxError::TooManyHandlers {
                            topic: topic.to_string(),
                            max,
                        });
                    }
                }
            }

            for (topic, handler) in &entries {
                let token = self.tokens.next();
                topics
                    .entry(topic.clone())
                    .or_default()
                    .insert(token, Arc::clone(handler));
                issued.push((topic.clone(), token));
            }
        }

        for ((topic, token), (_, handler)) in issued.iter().zip(&entries) {
            self.report_added(topic, *token, handler);
        }
        Ok(issued)
    }

    /// Removes the subscriptions of `topic` picked by `selector`.
    ///
    /// Returns how many subscriptions were removed; `0` is not an error.
    pub fn remove(&self, topic: &str, selector: &Selector<T>) -> usize {
        let removed = {
            let mut topics = self.lock();
            let Some(subs) = topics.get_mut(topic) else {
                return 0;
            };
            let removed = match selector {
                Selector::All => {
                    let n = subs.len();
                    subs.clear();
                    n
                }
                Selector::Token(token) => usize::from(subs.remove(token).is_some()),
                Selector::Handler(handler) => {
                    let before = subs.len();
                    subs.retain(|_, h| !same_handler(h, handler));
                    before - subs.len()
                }
            };
            if subs.is_empty() {
                topics.remove(topic);
            }
            removed
        };

        if removed > 0 {
            tracing::debug!(topic, removed, selector = ?selector, "unsubscribed");
            self.bus.publish(
                Event::new(EventKind::Unsubscribed)
                    .with_topic(topic)
                    .with_count(removed),
            );
        }
        removed
    }

    /// Returns the current subscriptions of `topic` in subscription order.
    ///
    /// The returned vector is a copy; an unknown topic yields an empty vector.
    pub fn snapshot(&self, topic: &str) -> Vec<(Token, HandlerRef<T>)> {
        self.lock()
            .get(topic)
            .map(|subs| {
                subs.iter()
                    .map(|(token, h)| (*token, Arc::clone(h)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Removes every topic and subscription. Returns the number of subscriptions dropped.
    ///
    /// The token counter is **not** reset: tokens issued before a clear stay dead.
    pub fn clear(&self) -> usize {
        let dropped: usize = {
            let mut topics = self.lock();
            let n = topics.values().map(BTreeMap::len).sum();
            topics.clear();
            n
        };

        tracing::debug!(removed = dropped, "registry cleared");
        self.bus
            .publish(Event::new(EventKind::Reset).with_count(dropped));
        dropped
    }

    /// Returns sorted list of topics with at least one subscription.
    pub fn topics(&self) -> Vec<Topic> {
        let mut names: Vec<Topic> = self.lock().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Number of subscriptions on `topic`.
    pub fn len(&self, topic: &str) -> usize {
        self.lock().get(topic).map_or(0, BTreeMap::len)
    }

    /// True if `topic` has at least one subscription.
    pub fn contains(&self, topic: &str) -> bool {
        self.lock().contains_key(topic)
    }

    /// True if no topic has any subscription.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Topic, Subscriptions<T>>> {
        self.topics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report_added(&self, topic: &Topic, token: Token, handler: &HandlerRef<T>) {
        let name = handler.name();
        tracing::debug!(topic = %topic, token = %token, handler = name, "subscribed");
        self.bus.publish(
            Event::new(EventKind::Subscribed)
                .with_topic(topic.shared())
                .with_token(token)
                .with_handler(name),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::handlers::{HandlerFn, Payload};

    fn noop(name: &'static str) -> HandlerRef<u32> {
        HandlerFn::arc(name, |_p: Payload<u32>| async { Ok::<_, HandlerError>(()) })
    }

    fn topic(name: &str) -> Topic {
        Topic::new(name).unwrap()
    }

    fn registry() -> Registry<u32> {
        Registry::new(Bus::new(64), None)
    }

    fn names(reg: &Registry<u32>, t: &str) -> Vec<String> {
        reg.snapshot(t)
            .iter()
            .map(|(_, h)| h.name().to_string())
            .collect()
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let reg = registry();
        let t = topic("orders");
        let a = reg.add(&t, noop("a")).unwrap();
        let b = reg.add(&t, noop("b")).unwrap();
        let c = reg.add(&t, noop("c")).unwrap();

        assert!(a < b && b < c);
        assert_eq!(names(&reg, "orders"), vec!["a", "b", "c"]);
        assert_eq!(reg.len("orders"), 3);
    }

    #[test]
    fn test_duplicate_handler_is_two_subscriptions() {
        let reg = registry();
        let t = topic("orders");
        let h = noop("dup");
        let first = reg.add(&t, Arc::clone(&h)).unwrap();
        let second = reg.add(&t, Arc::clone(&h)).unwrap();

        assert_ne!(first, second);
        assert_eq!(reg.len("orders"), 2);

        assert_eq!(reg.remove("orders", &Selector::Token(first)), 1);
        assert_eq!(reg.len("orders"), 1);
        assert_eq!(reg.snapshot("orders")[0].0, second);
    }

    #[test]
    fn test_remove_by_handler_removes_every_match() {
        let reg = registry();
        let t = topic("orders");
        let h = noop("dup");
        reg.add(&t, Arc::clone(&h)).unwrap();
        reg.add(&t, noop("other")).unwrap();
        reg.add(&t, Arc::clone(&h)).unwrap();

        assert_eq!(reg.remove("orders", &Selector::Handler(h)), 2);
        assert_eq!(names(&reg, "orders"), vec!["other"]);
    }

    #[test]
    fn test_remove_all_drops_topic() {
        let reg = registry();
        let t = topic("orders");
        reg.add(&t, noop("a")).unwrap();
        reg.add(&t, noop("b")).unwrap();

        assert_eq!(reg.remove("orders", &Selector::All), 2);
        assert!(!reg.contains("orders"));
        assert!(reg.is_empty());
        assert!(reg.snapshot("orders").is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let reg = registry();
        let t = topic("orders");
        let tok = reg.add(&t, noop("a")).unwrap();

        assert_eq!(reg.remove("orders", &Selector::Token(tok)), 1);
        assert_eq!(reg.remove("orders", &Selector::Token(tok)), 0);
        assert_eq!(reg.remove("orders", &Selector::All), 0);
        assert_eq!(reg.remove("missing", &Selector::All), 0);
        assert_eq!(reg.remove("", &Selector::All), 0);
    }

    #[test]
    fn test_token_from_other_topic_removes_nothing() {
        let reg = registry();
        let tok = reg.add(&topic("a"), noop("a")).unwrap();
        reg.add(&topic("b"), noop("b")).unwrap();

        assert_eq!(reg.remove("b", &Selector::Token(tok)), 0);
        assert_eq!(reg.len("a"), 1);
        assert_eq!(reg.len("b"), 1);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_mutation() {
        let reg = registry();
        let t = topic("orders");
        reg.add(&t, noop("a")).unwrap();
        reg.add(&t, noop("b")).unwrap();

        let snap = reg.snapshot("orders");
        reg.remove("orders", &Selector::All);
        reg.add(&t, noop("c")).unwrap();

        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].1.name(), "a");
        assert_eq!(names(&reg, "orders"), vec!["c"]);
    }

    #[test]
    fn test_clear_keeps_token_counter() {
        let reg = registry();
        let before = reg.add(&topic("a"), noop("a")).unwrap();
        reg.add(&topic("b"), noop("b")).unwrap();

        assert_eq!(reg.clear(), 2);
        assert!(reg.topics().is_empty());

        let after = reg.add(&topic("a"), noop("a")).unwrap();
        assert!(after > before);
        assert_eq!(reg.remove("a", &Selector::Token(before)), 0);
        assert_eq!(reg.len("a"), 1);
    }

    #[test]
    fn test_handler_limit() {
        let reg: Registry<u32> = Registry::new(Bus::new(8), Some(1));
        let t = topic("orders");
        reg.add(&t, noop("a")).unwrap();

        let err = reg.add(&t, noop("b")).unwrap_err();
        assert_eq!(
            err,
            EventboxError::TooManyHandlers {
                topic: "orders".into(),
                max: 1
            }
        );
        assert_eq!(reg.len("orders"), 1);
    }

    #[test]
    fn test_handler_limit_rejection_leaves_no_trace() {
        let reg: Registry<u32> = Registry::new(Bus::new(8), Some(1));
        let t = topic("orders");
        let first = reg.add(&t, noop("a")).unwrap();
        assert!(reg.add(&t, noop("b")).is_err());
        assert!(reg.add(&t, noop("c")).is_err());

        // no token was spent on the rejected adds
        let next = reg.add(&topic("users"), noop("d")).unwrap();
        assert_eq!(next.get(), first.get() + 1);
        assert_eq!(reg.topics().len(), 2);
    }

    #[test]
    fn test_add_all_is_all_or_nothing() {
        let reg: Registry<u32> = Registry::new(Bus::new(8), Some(1));
        let res = reg.add_all(vec![
            (topic("a"), noop("a")),
            (topic("b"), noop("b1")),
            (topic("b"), noop("b2")),
        ]);
        assert!(res.is_err());
        assert!(reg.is_empty());

        let issued = reg
            .add_all(vec![(topic("a"), noop("a")), (topic("b"), noop("b"))])
            .unwrap();
        assert_eq!(issued.len(), 2);
        assert_eq!(issued[0].0.as_str(), "a");
        assert_eq!(reg.topics(), vec![topic("a"), topic("b")]);
    }

    #[test]
    fn test_diagnostics() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let reg: Registry<u32> = Registry::new(bus, None);
        let tok = reg.add(&topic("orders"), noop("audit")).unwrap();
        reg.remove("orders", &Selector::Token(tok));
        reg.remove("orders", &Selector::Token(tok));
        reg.clear();

        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::Subscribed);
        assert_eq!(ev.token, Some(tok));
        assert_eq!(ev.handler.as_deref(), Some("audit"));

        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::Unsubscribed);
        assert_eq!(ev.count, Some(1));

        // the second, no-op removal reports nothing
        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::Reset);
        assert_eq!(ev.count, Some(0));
    }
}
