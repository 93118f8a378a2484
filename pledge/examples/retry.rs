//! Retrying an unreliable operation.
//!
//! Failed attempts are reported through the default diagnostic sink, which
//! logs them at `warn` level.

use pledge::{BackoffPolicy, RetryPolicy, Task, TaskError, after, retry};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Fails until its third call.
fn unreliable_operation(calls: &Cell<u32>) -> Task<String> {
    let call = calls.get() + 1;
    calls.set(call);

    let (timer, _handle) = after(Duration::from_millis(100));
    timer.on_settle(
        move |()| {
            if call < 3 {
                Err(TaskError::operation(format!("call {call} failed")))
            } else {
                Ok(format!("call {call} succeeded"))
            }
        },
        Err,
    )
}

#[pledge::main(name = "retry")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(error) = run().await {
        eprintln!("error: {error}");
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let calls = Rc::new(Cell::new(0));
    let policy = RetryPolicy::new(5)?.backoff(BackoffPolicy {
        first: Duration::from_millis(100),
        max: Duration::from_secs(1),
        factor: 2.0,
    });

    let counter = calls.clone();
    let result = retry(move || unreliable_operation(&counter), policy).await?;
    println!("{result} after {} calls", calls.get());

    let calls = Rc::new(Cell::new(0));
    let policy = RetryPolicy::new(2)?.fixed_delay(Duration::from_millis(50));

    let counter = calls.clone();
    match retry(move || unreliable_operation(&counter), policy).await {
        Err(TaskError::RetriesExhausted {
            attempts,
            last_error,
        }) => println!("gave up after {attempts} attempts: {last_error}"),
        other => println!("unexpected: {other:?}"),
    }

    Ok(())
}
