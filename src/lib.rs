//! # eventbox
//!
//! **Eventbox** is an in-process, topic-based publish/subscribe dispatcher.
//!
//! Producers publish a payload on a named topic; independently subscribed
//! handlers receive it later, each in its own isolated emission. No network,
//! no persistence.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   subscribe("orders", audit)      publish("orders", order)
//!            │                                │
//!            ▼                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Eventbox (dispatcher)                                            │
//! │  - Registry (topic ─► token ─► handler, subscription order)       │
//! │  - default emitter (Deferred over a Scheduler, replaceable)       │
//! │  - Bus (broadcast diagnostics)                                    │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        │ snapshot         │                  │               │
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │  Emission    │   │  Emission    │   │  Emission    │   │
//!     │ (#1, audit)  │   │ (#4, mailer) │   │ (#7, audit)  │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ emitter.emit()   │                  │                 │
//!      ▼                  ▼                  ▼                 │
//! ┌───────────────────────────────────────────────────────────┐ │
//! │  Scheduler::schedule_soon (tokio task / manual queue)     │ │
//! └─────────────────────────────┬─────────────────────────────┘ │
//!                               ▼                               ▼
//!                    Handler::handle(payload)     Bus: Subscribed, Published,
//!                    (errors + panics caught) ──► HandlerFailed, HandlerPanicked, ...
//! ```
//!
//! ### Lifecycle of a publish
//! ```text
//! publish(topic, payload)
//!   ├─► validate topic (non-empty)            ─► Err(InvalidTopic)
//!   ├─► snapshot handlers of topic            (empty ─► Ok(0), nothing scheduled)
//!   ├─► wrap payload in one Arc
//!   ├─► for each (token, handler) in order:
//!   │       emitter.emit(Emission)
//!   └─► publish Published{ topic, count }; return Ok(count)
//!
//! later, per emission:
//!   ├─ Ok    ──► done
//!   ├─ Err   ──► warn! + HandlerFailed
//!   └─ panic ──► error! + HandlerPanicked
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                         |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Dispatch**      | Subscribe, publish, unsubscribe, relay, reset.               | [`Eventbox`], [`EventboxBuilder`]          |
//! | **Handlers**      | Async handlers as trait objects or closures.                 | [`Handler`], [`HandlerFn`], [`BoundFn`]    |
//! | **Identity**      | Tokens per subscription; removal selectors.                  | [`Token`], [`Selector`], [`Topic`]         |
//! | **Emission**      | Replaceable strategy: deferred, inline or custom.            | [`Emit`], [`Deferred`], [`Inline`]         |
//! | **Scheduling**    | Where deferred emissions run.                                | [`Scheduler`], [`TokioScheduler`], [`ManualScheduler`] |
//! | **Diagnostics**   | Broadcast events for subscriptions, publishes and failures.  | [`Event`], [`EventKind`]                   |
//! | **Errors**        | Typed API and handler errors.                                | [`EventboxError`], [`HandlerError`]        |
//! | **Configuration** | Instance settings.                                           | [`Config`]                                 |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], which drains diagnostics into `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventbox::{Eventbox, HandlerError, HandlerFn, HandlerRef, Payload};
//!
//! #[derive(Debug)]
//! struct Greeting {
//!     name: String,
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus: Eventbox<Greeting> = Eventbox::new()?;
//!     let (tx, rx) = tokio::sync::oneshot::channel();
//!     let tx = std::sync::Mutex::new(Some(tx));
//!
//!     let greet: HandlerRef<Greeting> = HandlerFn::arc("greet", move |g: Payload<Greeting>| {
//!         let tx = tx.lock().ok().and_then(|mut slot| slot.take());
//!         async move {
//!             println!("hello, {}", g.name);
//!             if let Some(tx) = tx {
//!                 let _ = tx.send(());
//!             }
//!             Ok::<_, HandlerError>(())
//!         }
//!     });
//!
//!     let token = bus.subscribe("hello", Arc::clone(&greet))?;
//!     bus.publish("hello", Greeting { name: "Ada".into() })?; // returns before `greet` runs
//!
//!     rx.await?;
//!     bus.unsubscribe("hello", token);
//!     Ok(())
//! }
//! ```
mod core;
mod emit;
mod error;
mod events;
mod handlers;
mod topics;

// ---- Public re-exports ----

pub use core::{Config, Eventbox, EventboxBuilder};
pub use emit::{Deferred, Emission, Emit, EmitterRef, Inline, ManualScheduler, Scheduler, TokioScheduler};
pub use error::{EventboxError, HandlerError};
pub use events::{Event, EventKind};
pub use handlers::{same_handler, BoundFn, Handler, HandlerFn, HandlerRef, Payload};
pub use topics::{Selector, Token, Topic};

// Optional: built-in diagnostics writer.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
mod observers;
#[cfg(feature = "logging")]
pub use observers::LogWriter;
