//! # Inline emitter.
//!
//! [`Inline`] runs each emission to completion inside the `emit` call, i.e.
//! synchronously within `publish`. This relaxes the deferral contract and is
//! only ever used when the caller asks for it, per call or as the default.
//!
//! The handler future is polled once in place; handlers that complete without
//! waiting (the common case, including ones that publish again inline) are done
//! when `emit` returns. A handler that does wait is finished depending on where
//! `publish` was called:
//!
//! - multi-thread tokio runtime: blocks in place until the handler completes;
//! - `current_thread` tokio runtime: the rest of the handler is spawned on that
//!   runtime, since blocking its only thread would stop the handler from ever
//!   being woken;
//! - outside tokio: driven to completion on a local executor.
//!
//! Failures are still isolated and reported.

use futures::FutureExt;
use tokio::runtime::{Handle, RuntimeFlavor};

use super::emitter::{Emission, Emit};

/// Emitter that invokes the handler immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct Inline;

impl<T> Emit<T> for Inline
where
    T: Send + Sync + 'static,
{
    fn emit(&self, emission: Emission<T>) {
        let topic = emission.topic().clone();
        let token = emission.token();

        let mut run = Box::pin(emission.run());
        if run.as_mut().now_or_never().is_some() {
            return;
        }

        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => {
                tracing::debug!(%topic, %token, "inline handler suspended; finishing on the runtime");
                drop(handle.spawn(run));
            }
            Ok(handle) => {
                let _ = tokio::task::block_in_place(|| handle.block_on(run));
            }
            Err(_) => {
                let _ = futures::executor::block_on(run);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::handlers::{HandlerFn, Payload};
    use crate::{Config, Eventbox, ManualScheduler};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn sleeper(started: &Arc<AtomicUsize>, done: &Arc<AtomicUsize>) -> crate::HandlerRef<u8> {
        let started = Arc::clone(started);
        let done = Arc::clone(done);
        HandlerFn::arc("sleeper", move |_p: Payload<u8>| {
            let started = Arc::clone(&started);
            let done = Arc::clone(&done);
            async move {
                started.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                done.fetch_add(1, Ordering::SeqCst);
                Ok::<_, HandlerError>(())
            }
        })
    }

    fn manual_bus() -> Eventbox<u8> {
        Eventbox::builder(Config::default())
            .with_scheduler(Arc::new(ManualScheduler::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_ready_handler_completes_inside_emit() {
        let bus = manual_bus();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        bus.subscribe(
            "t",
            HandlerFn::arc("count", move |_p: Payload<u8>| {
                h.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, HandlerError>(()) }
            }),
        )
        .unwrap();

        bus.publish_with("t", 1, &Inline).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_suspended_handler_does_not_block_current_thread_runtime() {
        let bus = manual_bus();
        let started = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicUsize::new(0));
        bus.subscribe("t", sleeper(&started, &done)).unwrap();

        bus.publish_with("t", 1, &Inline).unwrap();
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(done.load(Ordering::SeqCst), 0);

        tokio::time::timeout(Duration::from_secs(3), async {
            while done.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_suspended_handler_finishes_in_place_on_multi_thread_runtime() {
        let bus = manual_bus();
        let started = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicUsize::new(0));
        bus.subscribe("t", sleeper(&started, &done)).unwrap();

        bus.publish_with("t", 1, &Inline).unwrap();
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }
}
