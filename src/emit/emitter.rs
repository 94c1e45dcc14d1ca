//! # Emitter trait and emission work item.
//!
//! [`Emit`] is the pluggable strategy deciding how a handler is invoked
//! relative to the publish call. [`Emission`] carries everything needed to
//! invoke one handler once, plus the topic and token for reporting.
//!
//! ## Failure isolation
//! [`Emission::run`] wraps the handler future in `catch_unwind`:
//! - `Err(HandlerError)` → logged with `warn!`, published as `HandlerFailed`
//! - panic → logged with `error!`, published as `HandlerPanicked`
//!
//! Nothing escapes to the emitter or the publisher.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a handler panics while holding a lock.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::HandlerError;
use crate::events::{Bus, Event, EventKind};
use crate::handlers::{same_handler, HandlerRef, Payload};
use crate::topics::{Token, Topic};

/// Emission strategy.
///
/// Receives every emission of a publish, in subscription order. Implementations
/// decide when [`Emission::run`] is driven: later (the default), immediately,
/// or not at all.
///
/// Closures taking an [`Emission`] implement this trait.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use eventbox::{Emission, EmitterRef};
///
/// // Record which topics were emitted without running anything.
/// let log = Arc::new(std::sync::Mutex::new(Vec::new()));
/// let sink = Arc::clone(&log);
/// let recorder: EmitterRef<u32> = Arc::new(move |em: Emission<u32>| {
///     sink.lock().unwrap().push(em.topic().to_string());
/// });
/// # let _ = recorder;
/// ```
pub trait Emit<T>: Send + Sync + 'static {
    /// Takes ownership of one emission.
    fn emit(&self, emission: Emission<T>);
}

impl<T, F> Emit<T> for F
where
    T: Send + Sync + 'static,
    F: Fn(Emission<T>) + Send + Sync + 'static,
{
    fn emit(&self, emission: Emission<T>) {
        self(emission)
    }
}

/// Shared handle to an emitter.
pub type EmitterRef<T> = Arc<dyn Emit<T>>;

/// One scheduled invocation of one handler with one payload.
pub struct Emission<T> {
    topic: Topic,
    token: Token,
    handler: HandlerRef<T>,
    payload: Payload<T>,
    bus: Bus,
}

impl<T> Emission<T>
where
    T: Send + Sync + 'static,
{
    pub(crate) fn new(
        topic: Topic,
        token: Token,
        handler: HandlerRef<T>,
        payload: Payload<T>,
        bus: Bus,
    ) -> Self {
        Self {
            topic,
            token,
            handler,
            payload,
            bus,
        }
    }

    /// Topic that was published.
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Token of the subscription this emission targets.
    pub fn token(&self) -> Token {
        self.token
    }

    /// Handler that will be invoked.
    pub fn handler(&self) -> &HandlerRef<T> {
        &self.handler
    }

    /// Payload that will be delivered.
    pub fn payload(&self) -> &Payload<T> {
        &self.payload
    }

    /// True if this emission targets `handler` (same allocation).
    pub fn is_for(&self, handler: &HandlerRef<T>) -> bool {
        same_handler(&self.handler, handler)
    }

    /// Invokes the handler once, isolating errors and panics.
    ///
    /// Failures are reported (log + diagnostic event) before being returned,
    /// so emitters are free to discard the result.
    pub async fn run(self) -> Result<(), HandlerError> {
        let handler = Arc::clone(&self.handler);
        let payload = Arc::clone(&self.payload);
        let fut = async move { handler.handle(payload).await };

        let res = match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(res) => res,
            Err(panic_err) => Err(HandlerError::Panicked {
                info: panic_info(&*panic_err),
            }),
        };
        if let Err(err) = &res {
            self.report(err);
        }
        res
    }

    /// Converts the emission into a boxed task suitable for a [`Scheduler`](crate::Scheduler).
    pub fn into_task(self) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            let _ = self.run().await;
        })
    }

    fn report(&self, err: &HandlerError) {
        let handler = self.handler.name();
        let kind = if err.is_panic() {
            tracing::error!(
                topic = %self.topic,
                token = %self.token,
                handler,
                info = %err,
                "handler panicked"
            );
            EventKind::HandlerPanicked
        } else {
            tracing::warn!(
                topic = %self.topic,
                token = %self.token,
                handler,
                error = %err,
                "handler failed"
            );
            EventKind::HandlerFailed
        };

        self.bus.publish(
            Event::new(kind)
                .with_topic(self.topic.shared())
                .with_token(self.token)
                .with_handler(handler)
                .with_reason(err.as_message()),
        );
    }
}

impl<T> fmt::Debug for Emission<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emission")
            .field("topic", &self.topic)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

fn panic_info(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::HandlerFn;
    use crate::topics::TokenSource;

    fn emission(handler: HandlerRef<u32>, bus: &Bus) -> Emission<u32> {
        Emission::new(
            Topic::new("numbers").unwrap(),
            TokenSource::new().next(),
            handler,
            Arc::new(7),
            bus.clone(),
        )
    }

    #[test]
    fn test_success_reports_nothing() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let h: HandlerRef<u32> = HandlerFn::arc("ok", |p: Payload<u32>| async move {
            assert_eq!(*p, 7);
            Ok::<_, HandlerError>(())
        });

        let res = futures::executor::block_on(emission(h, &bus).run());
        assert!(res.is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_error_is_reported() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let h: HandlerRef<u32> = HandlerFn::arc("broken", |_p: Payload<u32>| async {
            Err::<(), _>(HandlerError::fail("db down"))
        });

        let res = futures::executor::block_on(emission(h, &bus).run());
        assert_eq!(res, Err(HandlerError::fail("db down")));

        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::HandlerFailed);
        assert_eq!(ev.topic.as_deref(), Some("numbers"));
        assert_eq!(ev.handler.as_deref(), Some("broken"));
        assert_eq!(ev.reason.as_deref(), Some("error: db down"));
    }

    #[test]
    fn test_panic_is_caught_and_reported() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let h: HandlerRef<u32> = HandlerFn::arc("explodes", |_p: Payload<u32>| async {
            if true {
                panic!("kaboom");
            }
            Ok::<_, HandlerError>(())
        });

        let res = futures::executor::block_on(emission(h, &bus).run());
        assert_eq!(
            res,
            Err(HandlerError::Panicked {
                info: "kaboom".to_string()
            })
        );
        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::HandlerPanicked);
        assert!(ev.is_failure());
    }

    #[test]
    fn test_accessors_and_identity() {
        let bus = Bus::new(1);
        let h: HandlerRef<u32> = HandlerFn::arc("id", |_p: Payload<u32>| async { Ok::<_, HandlerError>(()) });
        let other: HandlerRef<u32> = HandlerFn::arc("id", |_p: Payload<u32>| async { Ok::<_, HandlerError>(()) });
        let em = emission(Arc::clone(&h), &bus);

        assert_eq!(em.topic().as_str(), "numbers");
        assert_eq!(em.token().get(), 1);
        assert_eq!(**em.payload(), 7);
        assert!(em.is_for(&h));
        assert!(!em.is_for(&other));
        assert!(format!("{em:?}").starts_with("Emission"));
    }

    #[test]
    fn test_closure_is_an_emitter() {
        let bus = Bus::new(1);
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let emitter: EmitterRef<u32> = Arc::new(move |em: Emission<u32>| {
            sink.lock().unwrap().push(em.token());
        });
        let h: HandlerRef<u32> = HandlerFn::arc("noop", |_p: Payload<u32>| async { Ok::<_, HandlerError>(()) });

        let em = emission(h, &bus);
        let token = em.token();
        emitter.emit(em);
        assert_eq!(*seen.lock().unwrap(), vec![token]);
    }
}
