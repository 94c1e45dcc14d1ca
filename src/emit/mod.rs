//! # Emission strategies.
//!
//! An emission is one `(handler, payload)` pair produced by a publish. *How*
//! and *when* it runs is decided by an emitter:
//!
//! ```text
//! publish(topic, payload)
//!     │  snapshot handlers
//!     ├──► Emission#1 ──► emitter.emit() ──► Deferred ──► Scheduler::schedule_soon ──► run later
//!     ├──► Emission#2 ──► emitter.emit() ──► Inline   ──► run now (caller's choice)
//!     └──► Emission#N ──► emitter.emit() ──► custom closure
//! ```
//!
//! - [`Emit`] / [`EmitterRef`]: the strategy seam; any `Fn(Emission<T>)` is an emitter.
//! - [`Emission`]: the work item; [`Emission::run`] invokes the handler with error and panic isolation.
//! - [`Scheduler`]: the deferral capability, `schedule_soon(task)`.
//! - [`TokioScheduler`]: spawns each task onto a tokio runtime.
//! - [`ManualScheduler`]: queues tasks until the test says so.
//! - [`Deferred`]: the default emitter, never runs a handler on the publisher's stack.
//! - [`Inline`]: runs the handler synchronously inside `publish`.

mod deferred;
mod emitter;
mod inline;
mod scheduler;

pub use deferred::Deferred;
pub use emitter::{Emission, Emit, EmitterRef};
pub use inline::Inline;
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
