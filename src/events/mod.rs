//! Diagnostic events: types and broadcast bus.
//!
//! This module groups the diagnostic **data model** and the **bus** used to
//! observe what an [`Eventbox`](crate::Eventbox) does: subscriptions coming and
//! going, publishes, and handler failures.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the registry (subscribe/unsubscribe/reset), the dispatcher
//!   (publish, emitter changes) and emissions (handler failures/panics).
//! - **Consumers**: anything holding a receiver from
//!   [`Eventbox::diagnostics`](crate::Eventbox::diagnostics), e.g. the
//!   `LogWriter` observer behind the `logging` feature.
//!
//! Diagnostics are fire-and-forget: with no receiver attached they are dropped.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
