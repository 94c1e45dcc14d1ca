//! Error types used by the eventbox registry, dispatcher and handlers.
//!
//! This module defines two main error enums:
//!
//! - [`EventboxError`]: errors raised synchronously at the public API boundary.
//! - [`HandlerError`]: failures of individual handler invocations.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/diagnostics.
//!
//! Removing an unknown topic, token or handler is **not** an error: removal is
//! idempotent and reports the number of subscriptions it dropped instead.

use thiserror::Error;

/// # Errors produced by the eventbox API.
///
/// Only malformed input and misconfiguration raise; "not found" conditions never do.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventboxError {
    /// Topic is not a usable identifier.
    #[error("invalid topic: {reason}")]
    InvalidTopic {
        /// Why the topic was rejected.
        reason: &'static str,
    },

    /// A per-topic handler cap is configured and the topic is full.
    #[error("topic {topic:?} already has {max} handlers")]
    TooManyHandlers {
        /// The topic that rejected the subscription.
        topic: String,
        /// The configured cap.
        max: usize,
    },

    /// No scheduler was supplied and no tokio runtime is running on this thread.
    #[error("no tokio runtime available for the default scheduler")]
    RuntimeUnavailable,

    /// The default scheduler was asked to use a multi-thread runtime.
    ///
    /// Its workers could run handlers before `publish` returns; opt in with
    /// [`TokioScheduler::parallel`](crate::TokioScheduler::parallel) instead.
    #[error("default scheduler needs a current_thread tokio runtime")]
    MultiThreadRuntime,
}

impl EventboxError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventbox::EventboxError;
    ///
    /// let err = EventboxError::InvalidTopic { reason: "empty" };
    /// assert_eq!(err.as_label(), "invalid_topic");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EventboxError::InvalidTopic { .. } => "invalid_topic",
            EventboxError::TooManyHandlers { .. } => "too_many_handlers",
            EventboxError::RuntimeUnavailable => "runtime_unavailable",
            EventboxError::MultiThreadRuntime => "multi_thread_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EventboxError::InvalidTopic { reason } => format!("invalid topic: {reason}"),
            EventboxError::TooManyHandlers { topic, max } => {
                format!("handler limit reached; topic={topic:?} max={max}")
            }
            EventboxError::RuntimeUnavailable => "runtime unavailable".to_string(),
            EventboxError::MultiThreadRuntime => {
                "multi-thread runtime; use TokioScheduler::parallel".to_string()
            }
        }
    }
}

/// # Errors produced by handler invocations.
///
/// These never reach the publisher: they are caught where the handler is
/// invoked, logged, and broadcast as diagnostic events.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Handler returned an error.
    #[error("handler failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Handler panicked; the panic was caught at the invocation point.
    #[error("handler panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Fail`].
    ///
    /// # Example
    /// ```
    /// use eventbox::HandlerError;
    ///
    /// let err = HandlerError::fail("db down");
    /// assert_eq!(err.to_string(), "handler failed: db down");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        HandlerError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Fail { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Fail { error } => format!("error: {error}"),
            HandlerError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// True if the handler panicked rather than returning an error.
    pub fn is_panic(&self) -> bool {
        matches!(self, HandlerError::Panicked { .. })
    }
}
