//! # Function-backed handlers (`HandlerFn`, `BoundFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(Payload<T>) -> Fut`, producing a fresh
//! future per emission. [`BoundFn`] does the same for closures that need a
//! context object: the context is an explicit first argument fixed at
//! construction time, so there is no "current scope" to leak between calls.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use eventbox::{BoundFn, HandlerError, HandlerFn, HandlerRef, Payload};
//!
//! let h: HandlerRef<u32> = HandlerFn::arc("printer", |n: Payload<u32>| async move {
//!     let _ = *n;
//!     Ok::<_, HandlerError>(())
//! });
//! assert_eq!(h.name(), "printer");
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter: HandlerRef<u32> = BoundFn::arc(
//!     "counter",
//!     seen,
//!     |ctx: Arc<AtomicUsize>, n: Payload<u32>| async move {
//!         ctx.fetch_add(*n as usize, Ordering::SeqCst);
//!         Ok::<_, HandlerError>(())
//!     },
//! );
//! assert_eq!(counter.name(), "counter");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::handlers::handler::{Handler, Payload};

/// Closure-backed handler.
#[derive(Debug)]
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`](crate::HandlerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<T, F, Fut> Handler<T> for HandlerFn<F>
where
    T: Send + Sync + 'static,
    F: Fn(Payload<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, payload: Payload<T>) -> Result<(), HandlerError> {
        (self.f)(payload).await
    }
}

/// Closure-backed handler invoked with a fixed context.
#[derive(Debug)]
pub struct BoundFn<C, F> {
    name: Cow<'static, str>,
    ctx: Arc<C>,
    f: F,
}

impl<C, F> BoundFn<C, F> {
    /// Creates a handler that calls `f(ctx, payload)` on every emission.
    pub fn new(name: impl Into<Cow<'static, str>>, ctx: Arc<C>, f: F) -> Self {
        Self {
            name: name.into(),
            ctx,
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, ctx: Arc<C>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, ctx, f))
    }

    /// Returns the bound context.
    pub fn context(&self) -> &Arc<C> {
        &self.ctx
    }
}

#[async_trait]
impl<T, C, F, Fut> Handler<T> for BoundFn<C, F>
where
    T: Send + Sync + 'static,
    C: Send + Sync + 'static,
    F: Fn(Arc<C>, Payload<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, payload: Payload<T>) -> Result<(), HandlerError> {
        (self.f)(Arc::clone(&self.ctx), payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{same_handler, HandlerRef};
    use std::sync::Mutex;

    #[test]
    fn test_handler_fn_forwards_payload() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let h: HandlerRef<String> = HandlerFn::arc("collect", move |p: Payload<String>| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push((*p).clone());
                Ok::<_, HandlerError>(())
            }
        });

        futures::executor::block_on(h.handle(Arc::new("a".to_string()))).unwrap();
        futures::executor::block_on(h.handle(Arc::new("b".to_string()))).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_handler_fn_propagates_error() {
        let h: HandlerRef<u8> = HandlerFn::arc("fails", |_p: Payload<u8>| async {
            Err::<(), _>(HandlerError::fail("nope"))
        });
        let res = futures::executor::block_on(h.handle(Arc::new(1)));
        assert_eq!(res, Err(HandlerError::fail("nope")));
    }

    #[test]
    fn test_bound_fn_receives_context() {
        let ctx = Arc::new(Mutex::new(0u32));
        let bound = BoundFn::arc("sum", Arc::clone(&ctx), |c: Arc<Mutex<u32>>, p: Payload<u32>| async move {
            *c.lock().unwrap() += *p;
            Ok::<_, HandlerError>(())
        });
        assert!(Arc::ptr_eq(bound.context(), &ctx));

        let h: HandlerRef<u32> = bound;
        futures::executor::block_on(h.handle(Arc::new(3))).unwrap();
        futures::executor::block_on(h.handle(Arc::new(4))).unwrap();
        assert_eq!(*ctx.lock().unwrap(), 7);
    }

    #[test]
    fn test_identity_is_per_allocation() {
        let make = || -> HandlerRef<u8> { HandlerFn::arc("same", |_p: Payload<u8>| async { Ok::<_, HandlerError>(()) }) };
        let a = make();
        let b = make();
        let a2 = Arc::clone(&a);
        assert!(same_handler(&a, &a2));
        assert!(!same_handler(&a, &b));
    }
}
