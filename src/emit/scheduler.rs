//! # Deferral capability.
//!
//! A [`Scheduler`] accepts boxed tasks and runs them *later*: never inside the
//! `schedule_soon` call. The default emitter is built on top of it, which is
//! what keeps handlers off the publisher's stack.
//!
//! - [`TokioScheduler`] spawns each task on a `current_thread` tokio runtime.
//!   The task runs once the publishing task yields, so it never starts before
//!   `publish` returns. Multi-thread runtimes are rejected unless the caller
//!   opts into [`TokioScheduler::parallel`], where a worker may pick the task
//!   up while `publish` is still running.
//! - [`ManualScheduler`] keeps tasks in a FIFO queue until
//!   [`run_pending`](ManualScheduler::run_pending) is called. Use it in tests
//!   to observe state between "published" and "delivered".

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use futures::future::BoxFuture;
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::error::EventboxError;

/// Runs tasks soon, but never synchronously.
pub trait Scheduler: Send + Sync + 'static {
    /// Queues `task` for execution after the current call returns.
    fn schedule_soon(&self, task: BoxFuture<'static, ()>);
}

/// Scheduler backed by a tokio runtime handle.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: Handle,
    parallel: bool,
}

impl TokioScheduler {
    /// Uses the given `current_thread` runtime.
    ///
    /// Returns [`EventboxError::MultiThreadRuntime`] for any other flavor:
    /// its workers could run a handler before `publish` returns.
    pub fn new(handle: Handle) -> Result<Self, EventboxError> {
        match handle.runtime_flavor() {
            RuntimeFlavor::CurrentThread => Ok(Self {
                handle,
                parallel: false,
            }),
            _ => Err(EventboxError::MultiThreadRuntime),
        }
    }

    /// Uses the given runtime, whatever its flavor.
    ///
    /// On a multi-thread runtime a handler may start on another worker while
    /// the `publish` that scheduled it is still running. Handlers still never
    /// run on the publisher's stack.
    pub fn parallel(handle: Handle) -> Self {
        Self {
            handle,
            parallel: true,
        }
    }

    /// Uses the runtime the caller is running on, see [`TokioScheduler::new`].
    ///
    /// Returns [`EventboxError::RuntimeUnavailable`] outside a tokio runtime.
    pub fn try_current() -> Result<Self, EventboxError> {
        let handle = Handle::try_current().map_err(|_| EventboxError::RuntimeUnavailable)?;
        Self::new(handle)
    }

    /// True if built with [`TokioScheduler::parallel`].
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_soon(&self, task: BoxFuture<'static, ()>) {
        // Detached: emissions cannot be cancelled once handed over.
        drop(self.handle.spawn(task));
    }
}

/// Scheduler that only runs tasks when asked to.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use eventbox::{ManualScheduler, Scheduler};
///
/// let sched = ManualScheduler::new();
/// let ran = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&ran);
/// sched.schedule_soon(Box::pin(async move { flag.store(true, Ordering::SeqCst) }));
///
/// assert!(!ran.load(Ordering::SeqCst));
/// assert_eq!(sched.run_pending(), 1);
/// assert!(ran.load(Ordering::SeqCst));
/// ```
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<VecDeque<BoxFuture<'static, ()>>>,
}

impl ManualScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Runs the oldest queued task to completion. Returns `false` if the queue was empty.
    ///
    /// The task is driven with a local executor; it must not depend on a
    /// tokio reactor (timers, sockets).
    pub fn run_next(&self) -> bool {
        let task = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match task {
            Some(task) => {
                futures::executor::block_on(task);
                true
            }
            None => false,
        }
    }

    /// Runs queued tasks until the queue is empty, including tasks queued while running.
    ///
    /// Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }

    /// Drops every queued task without running it.
    pub fn discard(&self) -> usize {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let n = queue.len();
        queue.clear();
        n
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_soon(&self, task: BoxFuture<'static, ()>) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(task);
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
