//! # LogWriter: diagnostics to `tracing`
//!
//! Drains a diagnostics receiver on a tokio task and writes each [`Event`]
//! as a structured `tracing` line. Failures go out at `warn`/`error`,
//! everything else at `debug`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! DEBUG eventbox: [subscribed] topic="orders" token=#1 handler="audit"
//! DEBUG eventbox: [published] topic="orders" emissions=1
//!  WARN eventbox: [handler-failed] topic="orders" token=#1 handler="audit" reason="error: db down"
//! DEBUG eventbox: [unsubscribed] topic="orders" count=1
//! ```

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::{Event, EventKind};

const UNKNOWN: &str = "unknown";

/// Diagnostics writer.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Spawns a task writing every event received on `rx` until `cancel`
    /// fires or the eventbox is dropped.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn(
        self,
        mut rx: broadcast::Receiver<Event>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => self.write(&ev),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "[diagnostics-lagged]");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        })
    }

    /// Writes one event.
    pub fn write(&self, e: &Event) {
        let topic = e.topic.as_deref().unwrap_or(UNKNOWN);
        let handler = e.handler.as_deref().unwrap_or(UNKNOWN);
        let reason = e.reason.as_deref().unwrap_or(UNKNOWN);
        let token = e.token.map(|t| t.get()).unwrap_or_default();
        let count = e.count.unwrap_or_default();

        match e.kind {
            EventKind::Subscribed => {
                tracing::debug!(seq = e.seq, topic, token, handler, "[subscribed]");
            }
            EventKind::Unsubscribed => {
                tracing::debug!(seq = e.seq, topic, count, "[unsubscribed]");
            }
            EventKind::Reset => {
                tracing::debug!(seq = e.seq, count, "[reset]");
            }
            EventKind::Published => {
                tracing::debug!(seq = e.seq, topic, emissions = count, "[published]");
            }
            EventKind::EmitterChanged => {
                tracing::debug!(seq = e.seq, emitter = reason, "[emitter-changed]");
            }
            EventKind::HandlerFailed => {
                tracing::warn!(seq = e.seq, topic, token, handler, reason, "[handler-failed]");
            }
            EventKind::HandlerPanicked => {
                tracing::error!(seq = e.seq, topic, token, handler, reason, "[handler-panicked]");
            }
        }
    }
}
