//! # Deferred emitter (the default).
//!
//! [`Deferred`] converts each emission into a task and hands it to a
//! [`Scheduler`]. The handler therefore never runs inside `publish`: a chain of
//! publishes never deepens the stack, and a failing handler cannot unwind into
//! the publisher.

use std::fmt;
use std::sync::Arc;

use super::emitter::{Emission, Emit};
use super::scheduler::Scheduler;

/// Emitter that schedules every emission on a [`Scheduler`].
#[derive(Clone)]
pub struct Deferred {
    scheduler: Arc<dyn Scheduler>,
}

impl Deferred {
    /// Creates a deferred emitter over `scheduler`.
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self { scheduler }
    }

    /// Returns the underlying scheduler.
    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }
}

impl<T> Emit<T> for Deferred
where
    T: Send + Sync + 'static,
{
    fn emit(&self, emission: Emission<T>) {
        self.scheduler.schedule_soon(emission.into_task());
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::ManualScheduler;
    use crate::error::HandlerError;
    use crate::events::Bus;
    use crate::handlers::{HandlerFn, HandlerRef, Payload};
    use crate::topics::{TokenSource, Topic};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_only_queues() {
        let sched = Arc::new(ManualScheduler::new());
        let emitter = Deferred::new(sched.clone());
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let handler: HandlerRef<u8> = HandlerFn::arc("count", move |_p: Payload<u8>| {
            let h = Arc::clone(&h);
            async move {
                h.fetch_add(1, Ordering::SeqCst);
                Ok::<_, HandlerError>(())
            }
        });

        let em = Emission::new(
            Topic::new("t").unwrap(),
            TokenSource::new().next(),
            handler,
            Arc::new(1u8),
            Bus::new(1),
        );
        emitter.emit(em);

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(sched.pending(), 1);
        sched.run_pending();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
