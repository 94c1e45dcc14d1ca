//! # Eventbox: subscription registry plus fan-out dispatcher.
//!
//! The [`Eventbox`] owns a [`Registry`], the default emitter and the
//! diagnostics [`Bus`]. Publishing takes a snapshot of the topic's handlers and
//! hands one [`Emission`] per handler to an emitter.
//!
//! ## High-level architecture
//! ```text
//! subscribe(topic, handler) ──► Registry::add ──► Token
//!
//! publish(topic, payload)
//!   ├─ Topic::new(topic)?                       (InvalidTopic on "")
//!   ├─ emitter = per-call override | default    (read once per call)
//!   ├─ Registry::snapshot(topic)                (copy; lock released)
//!   └─ for (token, handler) in snapshot:        (subscription order)
//!          emitter.emit(Emission{topic, token, handler, Arc<payload>})
//!                 │
//!                 └─ Deferred ─► Scheduler::schedule_soon ─► Emission::run later
//!                                                              ├─ Ok
//!                                                              ├─ Err   ─► warn! + HandlerFailed
//!                                                              └─ panic ─► error! + HandlerPanicked
//! ```
//!
//! ## Rules
//! - With the default emitter no handler ever runs inside `publish`.
//! - Removing a subscription after a publish snapshot was taken does **not**
//!   cancel the emission already handed to the emitter: it still fires.
//! - Every instance is independent: registry, tokens, default emitter and bus
//!   are all per-instance. Clones share the same instance.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use eventbox::{Config, Eventbox, HandlerError, HandlerFn, ManualScheduler, Payload};
//!
//! let sched = Arc::new(ManualScheduler::new());
//! let bus: Eventbox<String> = Eventbox::builder(Config::default())
//!     .with_scheduler(sched.clone())
//!     .build()
//!     .unwrap();
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let seen = Arc::clone(&calls);
//! bus.subscribe("hello", HandlerFn::arc("greet", move |name: Payload<String>| {
//!     let seen = Arc::clone(&seen);
//!     async move {
//!         assert_eq!(name.as_str(), "Ada");
//!         seen.fetch_add(1, Ordering::SeqCst);
//!         Ok::<_, HandlerError>(())
//!     }
//! })).unwrap();
//!
//! bus.publish("hello", "Ada".to_string()).unwrap();
//! assert_eq!(calls.load(Ordering::SeqCst), 0); // not called synchronously
//!
//! sched.run_pending();
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! ```

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tokio::sync::broadcast;

use crate::core::{builder::EventboxBuilder, config::Config, registry::Registry};
use crate::emit::{Emission, Emit, EmitterRef};
use crate::error::{EventboxError, HandlerError};
use crate::events::{Bus, Event, EventKind};
use crate::handlers::{BoundFn, HandlerFn, HandlerRef, Payload};
use crate::topics::{Selector, Token, Topic};

/// In-process topic publish/subscribe dispatcher.
///
/// Cheap to clone; clones share the same registry and emitter.
pub struct Eventbox<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    cfg: Config,
    registry: Registry<T>,
    emitter: RwLock<EmitterRef<T>>,
    builtin: EmitterRef<T>,
    bus: Bus,
}

impl<T> Clone for Eventbox<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Eventbox<T>
where
    T: Send + Sync + 'static,
{
    /// Creates an eventbox with default configuration, deferring emissions
    /// onto the tokio runtime the caller is running on.
    ///
    /// Returns [`EventboxError::RuntimeUnavailable`] outside a tokio runtime and
    /// [`EventboxError::MultiThreadRuntime`] on a multi-thread one; use
    /// [`Eventbox::builder`] with a scheduler in those cases.
    pub fn new() -> Result<Self, EventboxError> {
        Self::builder(Config::default()).build()
    }

    /// Starts building an eventbox with the given configuration.
    pub fn builder(cfg: Config) -> EventboxBuilder<T> {
        EventboxBuilder::new(cfg)
    }

    pub(crate) fn from_parts(cfg: Config, bus: Bus, builtin: EmitterRef<T>, initial: EmitterRef<T>) -> Self {
        let registry = Registry::new(bus.clone(), cfg.handler_limit());
        Self {
            inner: Arc::new(Inner {
                cfg,
                registry,
                emitter: RwLock::new(initial),
                builtin,
                bus,
            }),
        }
    }

    /// Configuration this instance was built with.
    pub fn config(&self) -> &Config {
        &self.inner.cfg
    }

    // ---- Subscribing ----

    /// Subscribes `handler` to `topic`.
    ///
    /// Returns a token that removes exactly this subscription. Subscribing the
    /// same handler twice creates two subscriptions, each invoked per publish.
    pub fn subscribe(
        &self,
        topic: impl AsRef<str>,
        handler: HandlerRef<T>,
    ) -> Result<Token, EventboxError> {
        let topic = Topic::new(topic)?;
        self.inner.registry.add(&topic, handler)
    }

    /// Subscribes a closure that receives `ctx` as its first argument.
    ///
    /// The handler is named after the context type.
    pub fn subscribe_bound<C, F, Fut>(
        &self,
        topic: impl AsRef<str>,
        ctx: Arc<C>,
        f: F,
    ) -> Result<Token, EventboxError>
    where
        C: Send + Sync + 'static,
        F: Fn(Arc<C>, Payload<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let name = std::any::type_name::<C>();
        self.subscribe(topic, BoundFn::arc(name, ctx, f))
    }

    /// Subscribes every `(topic, handler)` pair.
    ///
    /// All topics are validated first; on error nothing is subscribed. Tokens
    /// are returned in input order.
    pub fn subscribe_many<I, S>(&self, entries: I) -> Result<Vec<(Topic, Token)>, EventboxError>
    where
        I: IntoIterator<Item = (S, HandlerRef<T>)>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|(topic, handler)| Topic::new(topic).map(|t| (t, handler)))
            .collect::<Result<Vec<_>, _>>()?;
        self.inner.registry.add_all(entries)
    }

    // ---- Unsubscribing ----

    /// Removes subscriptions of `topic` picked by `selector`.
    ///
    /// Accepts a [`Token`], `Option<Token>` (`None` clears the topic), a
    /// [`HandlerRef`] (removes every subscription of that handler on the topic)
    /// or a [`Selector`]. Returns the number of subscriptions removed; unknown
    /// topics and stale tokens remove nothing and never error.
    pub fn unsubscribe(&self, topic: impl AsRef<str>, selector: impl Into<Selector<T>>) -> usize {
        self.inner
            .registry
            .remove(topic.as_ref(), &selector.into())
    }

    /// Applies [`unsubscribe`](Self::unsubscribe) to every `(topic, selector)` pair.
    pub fn unsubscribe_many<I, S, Sel>(&self, entries: I) -> usize
    where
        I: IntoIterator<Item = (S, Sel)>,
        S: AsRef<str>,
        Sel: Into<Selector<T>>,
    {
        entries
            .into_iter()
            .map(|(topic, selector)| self.unsubscribe(topic, selector))
            .sum()
    }

    /// Removes every topic and subscription. Returns the number of subscriptions dropped.
    ///
    /// Intended for test teardown. The default emitter is left as is and
    /// emissions already handed to the emitter still run.
    pub fn reset_all(&self) -> usize {
        self.inner.registry.clear()
    }

    // ---- Publishing ----

    /// Publishes `payload` to every handler of `topic` through the default emitter.
    ///
    /// Returns the number of emissions handed to the emitter. Publishing to a
    /// topic without subscribers is valid and returns `Ok(0)`.
    pub fn publish(&self, topic: impl AsRef<str>, payload: T) -> Result<usize, EventboxError> {
        let topic = Topic::new(topic)?;
        let emitter = self.default_emitter();
        Ok(self.fan_out(topic, payload, emitter.as_ref()))
    }

    /// Like [`publish`](Self::publish), but uses `emitter` for this call only.
    pub fn publish_with(
        &self,
        topic: impl AsRef<str>,
        payload: T,
        emitter: &dyn Emit<T>,
    ) -> Result<usize, EventboxError> {
        let topic = Topic::new(topic)?;
        Ok(self.fan_out(topic, payload, emitter))
    }

    /// Publishes each `(topic, payload)` pair in input order.
    ///
    /// All topics are validated first; on error nothing is published. Topics
    /// without subscribers are skipped. Returns the total number of emissions.
    pub fn publish_many<I, S>(&self, entries: I) -> Result<usize, EventboxError>
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
    {
        let entries = validate(entries)?;
        let emitter = self.default_emitter();
        Ok(self.fan_out_all(entries, emitter.as_ref()))
    }

    /// Like [`publish_many`](Self::publish_many), but uses `emitter` for this call only.
    pub fn publish_many_with<I, S>(
        &self,
        entries: I,
        emitter: &dyn Emit<T>,
    ) -> Result<usize, EventboxError>
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
    {
        let entries = validate(entries)?;
        Ok(self.fan_out_all(entries, emitter))
    }

    // ---- Emission strategy ----

    /// Replaces the default emitter, or restores the built-in one with `None`.
    ///
    /// Applies to every later publish that does not pass its own emitter.
    pub fn set_default_emitter(&self, emitter: Option<EmitterRef<T>>) {
        let (next, reason) = match emitter {
            Some(custom) => (custom, "custom"),
            None => (Arc::clone(&self.inner.builtin), "default"),
        };
        *self
            .inner
            .emitter
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;

        tracing::debug!(emitter = reason, "default emitter changed");
        self.inner
            .bus
            .publish(Event::new(EventKind::EmitterChanged).with_reason(reason));
    }

    // ---- Introspection ----

    /// Receiver for diagnostic events published after this call.
    pub fn diagnostics(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Sorted list of topics with at least one subscription.
    pub fn topics(&self) -> Vec<Topic> {
        self.inner.registry.topics()
    }

    /// Number of subscriptions on `topic`.
    pub fn handler_count(&self, topic: impl AsRef<str>) -> usize {
        self.inner.registry.len(topic.as_ref())
    }

    /// True if `topic` has at least one subscription.
    pub fn has_subscribers(&self, topic: impl AsRef<str>) -> bool {
        self.inner.registry.contains(topic.as_ref())
    }

    /// True if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.inner.registry.is_empty()
    }

    fn default_emitter(&self) -> EmitterRef<T> {
        Arc::clone(
            &self
                .inner
                .emitter
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    fn fan_out_all(&self, entries: Vec<(Topic, T)>, emitter: &dyn Emit<T>) -> usize {
        entries
            .into_iter()
            .map(|(topic, payload)| self.fan_out(topic, payload, emitter))
            .sum()
    }

    fn fan_out(&self, topic: Topic, payload: T, emitter: &dyn Emit<T>) -> usize {
        let handlers = self.inner.registry.snapshot(topic.as_str());
        let count = handlers.len();

        if count > 0 {
            let payload = Arc::new(payload);
            for (token, handler) in handlers {
                emitter.emit(Emission::new(
                    topic.clone(),
                    token,
                    handler,
                    Arc::clone(&payload),
                    self.inner.bus.clone(),
                ));
            }
        }

        tracing::debug!(topic = %topic, emissions = count, "published");
        self.inner.bus.publish(
            Event::new(EventKind::Published)
                .with_topic(topic.shared())
                .with_count(count),
        );
        count
    }

    fn downgrade(&self) -> Weak<Inner<T>> {
        Arc::downgrade(&self.inner)
    }
}

impl<T> Eventbox<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Subscribes a relay: whenever `topic` is published, every
    /// `(target, payload)` pair in `targets` is published in turn.
    ///
    /// The relay runs as an ordinary handler, so its publishes happen inside
    /// its own emission, never inside the triggering `publish`. It holds the
    /// eventbox weakly. Relays forming a cycle keep publishing forever; avoid them.
    pub fn relay<S, I, R>(&self, topic: S, targets: I) -> Result<Token, EventboxError>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (R, T)>,
        R: AsRef<str>,
    {
        let topic = Topic::new(topic)?;
        let targets: Arc<Vec<(Topic, T)>> = Arc::new(validate(targets)?);
        let weak = self.downgrade();

        let handler = HandlerFn::arc(format!("relay:{topic}"), move |_trigger: Payload<T>| {
            let weak = Weak::clone(&weak);
            let targets = Arc::clone(&targets);
            async move {
                if let Some(inner) = weak.upgrade() {
                    let bus = Eventbox { inner };
                    let emitter = bus.default_emitter();
                    bus.fan_out_all(targets.as_ref().clone(), emitter.as_ref());
                }
                Ok::<_, HandlerError>(())
            }
        });
        self.inner.registry.add(&topic, handler)
    }
}

fn validate<I, S, T>(entries: I) -> Result<Vec<(Topic, T)>, EventboxError>
where
    I: IntoIterator<Item = (S, T)>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .map(|(topic, payload)| Topic::new(topic).map(|t| (t, payload)))
        .collect()
}
