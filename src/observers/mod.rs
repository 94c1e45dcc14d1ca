//! # Diagnostic observers.
//!
//! Consumers of the diagnostics bus that ship with the crate.
//!
//! - [`LogWriter`] drains an [`Eventbox::diagnostics`](crate::Eventbox::diagnostics)
//!   receiver into `tracing`, one line per event, until cancelled.
//!
//! Available with the `logging` feature.

mod log;

pub use log::LogWriter;
