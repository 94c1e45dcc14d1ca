//! # Example: log_writer
//!
//! Routes eventbox diagnostics into `tracing` with the built-in [`LogWriter`].
//!
//! The example subscribes a healthy handler, a failing one and a panicking one,
//! publishes once, and lets `LogWriter` print what happened:
//!
//! ```text
//! DEBUG [subscribed] topic="orders" token=1 handler="audit"
//! DEBUG [published] topic="orders" emissions=3
//!  WARN [handler-failed] topic="orders" token=2 handler="mailer" reason="error: smtp down"
//! ERROR [handler-panicked] topic="orders" token=3 handler="fraud" reason="panic: model missing"
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example log_writer --features logging
//! ```

use std::time::Duration;

use eventbox::{Eventbox, HandlerError, HandlerFn, LogWriter, Payload};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let bus: Eventbox<u64> = Eventbox::new()?;

    // Attach the writer before anything happens so no event is missed
    let cancel = CancellationToken::new();
    let writer = LogWriter::new().spawn(bus.diagnostics(), cancel.clone());

    bus.subscribe(
        "orders",
        HandlerFn::arc("audit", |id: Payload<u64>| async move {
            println!("[audit] order #{id}");
            Ok::<_, HandlerError>(())
        }),
    )?;
    bus.subscribe(
        "orders",
        HandlerFn::arc("mailer", |_id: Payload<u64>| async {
            Err::<(), _>(HandlerError::fail("smtp down"))
        }),
    )?;
    bus.subscribe(
        "orders",
        HandlerFn::arc("fraud", |_id: Payload<u64>| async {
            if true {
                panic!("model missing");
            }
            Ok::<_, HandlerError>(())
        }),
    )?;

    bus.publish("orders", 42)?;

    // Give the emissions and the writer a moment, then stop the writer
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();
    writer.await?;
    Ok(())
}
