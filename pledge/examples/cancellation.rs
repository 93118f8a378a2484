//! Cancellation tokens and timeouts.

use pledge::{Task, TaskError, after, cancellation, sleep, spawn, with_timeout};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn long_operation(token: &pledge::CancellationToken) -> Task<&'static str> {
    Task::with_token(token, |resolver| {
        let (timer, handle) = after(Duration::from_secs(3));
        resolver.on_cancel(move || {
            handle.cancel();
            println!("long operation: timer released");
        });
        timer.map(move |()| resolver.resolve("long operation finished"));
    })
}

#[pledge::main(name = "cancellation")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("== cancellation token ==");
    let (token, controller) = cancellation();
    let operation = long_operation(&token);

    spawn(async move {
        sleep(Duration::from_millis(500)).await;
        println!("cancelling after 500ms");
        controller.cancel();
        Ok::<_, TaskError>(())
    });

    match operation.await {
        Err(TaskError::Cancelled) => println!("operation was cancelled"),
        other => println!("unexpected: {other:?}"),
    }

    println!("\n== timeout ==");
    let (token, _controller) = cancellation();
    match with_timeout(long_operation(&token), Duration::from_millis(300)).await {
        Err(TaskError::Timeout { timeout }) => println!("gave up after {timeout:?}"),
        other => println!("unexpected: {other:?}"),
    }

    let quick = Task::new(|resolver| {
        let (timer, _handle) = after(Duration::from_millis(50));
        timer.map(move |()| resolver.resolve("quick answer"));
    });
    match with_timeout(quick, Duration::from_millis(300)).await {
        Ok(value) => println!("in time: {value}"),
        Err(error) => println!("failed: {error}"),
    }
}
