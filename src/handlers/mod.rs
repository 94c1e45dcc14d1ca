//! # Handler abstractions.
//!
//! This module provides the handler-related types:
//! - [`Handler`] - trait for async topic handlers
//! - [`HandlerRef`] - shared reference to a handler (`Arc<dyn Handler<T>>`)
//! - [`HandlerFn`] - closure-backed handler
//! - [`BoundFn`] - closure-backed handler with an explicit bound context
//! - [`Payload`] - shared payload pointer delivered to every handler of a publish

mod handler;
mod handler_fn;

pub use handler::{same_handler, Handler, HandlerRef, Payload};
pub use handler_fn::{BoundFn, HandlerFn};
