//! # Handler trait.
//!
//! A handler receives the payload of every publish on the topics it is
//! subscribed to. It is always invoked from an emission, never from the
//! publisher's stack (unless the caller opted into a synchronous emitter).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;

/// Shared payload pointer.
///
/// One publish allocates one payload; every handler in the fan-out receives a
/// clone of the same `Arc`.
pub type Payload<T> = Arc<T>;

/// # Asynchronous topic handler.
///
/// Returning `Err` (or panicking) is reported through logs and diagnostic
/// events; it never affects sibling handlers or the publisher.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use eventbox::{Handler, HandlerError, Payload};
///
/// struct Audit;
///
/// #[async_trait]
/// impl Handler<String> for Audit {
///     fn name(&self) -> &str { "audit" }
///
///     async fn handle(&self, payload: Payload<String>) -> Result<(), HandlerError> {
///         if payload.is_empty() {
///             return Err(HandlerError::fail("empty record"));
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<T>: Send + Sync + 'static {
    /// Returns the handler name used in logs and diagnostic events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose; override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Handles one published payload.
    async fn handle(&self, payload: Payload<T>) -> Result<(), HandlerError>;
}

/// Shared handle to a handler.
pub type HandlerRef<T> = Arc<dyn Handler<T>>;

/// True if both references point at the same handler allocation.
///
/// This is the identity used by [`Selector::Handler`](crate::Selector::Handler).
#[inline]
pub fn same_handler<T>(a: &HandlerRef<T>, b: &HandlerRef<T>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
