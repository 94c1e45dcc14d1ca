//! # Example: hello
//!
//! Minimal publish/subscribe round trip on a `current_thread` runtime.
//!
//! Demonstrates how to:
//! - Subscribe a closure handler with [`HandlerFn`].
//! - Publish a payload and observe that the handler runs *after* `publish` returns.
//! - Unsubscribe by token and see later publishes reach nobody.
//!
//! ## Flow
//! ```text
//! subscribe("hello", greet) ──► Token #1
//! publish("hello", Greeting{name: "Ada"})
//!     ├─► snapshot [#1 greet]
//!     ├─► Deferred ─► TokioScheduler::schedule_soon
//!     └─► return Ok(1)                 (greet has not run yet)
//! rx.await ─► greet runs ─► "hello, Ada"
//! unsubscribe("hello", #1) ─► publish returns Ok(0)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example hello
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use eventbox::{Eventbox, HandlerError, HandlerFn, HandlerRef, Payload};

#[derive(Debug)]
struct Greeting {
    name: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Default eventbox: deferred emission on this runtime
    let bus: Eventbox<Greeting> = Eventbox::new()?;

    // 2. Handler that counts calls and signals the first one
    let calls = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = tokio::sync::oneshot::channel::<String>();
    let tx = Mutex::new(Some(tx));

    let seen = Arc::clone(&calls);
    let greet: HandlerRef<Greeting> = HandlerFn::arc("greet", move |g: Payload<Greeting>| {
        seen.fetch_add(1, Ordering::SeqCst);
        let tx = tx.lock().ok().and_then(|mut slot| slot.take());
        async move {
            println!("[greet] hello, {}", g.name);
            if let Some(tx) = tx {
                let _ = tx.send(g.name.clone());
            }
            Ok::<_, HandlerError>(())
        }
    });

    // 3. Subscribe and publish
    let token = bus.subscribe("hello", greet)?;
    let scheduled = bus.publish("hello", Greeting { name: "Ada".into() })?;
    println!(
        "[main] scheduled={scheduled} calls_after_publish={}",
        calls.load(Ordering::SeqCst)
    );

    // 4. Let the handler run
    let name = rx.await?;
    println!("[main] delivered to {name}; calls={}", calls.load(Ordering::SeqCst));

    // 5. Unsubscribe: nothing left to deliver to
    bus.unsubscribe("hello", token);
    let scheduled = bus.publish("hello", Greeting { name: "Bob".into() })?;
    println!("[main] after unsubscribe scheduled={scheduled}");
    Ok(())
}
