//! Walkthrough of the task primitives: creation, chaining and the
//! aggregation combinators.
//!
//! Run with `RUST_LOG=pledge=debug cargo run --example promises` to see the
//! runtime's own events.

use pledge::{Outcome, Task, TaskError, after, join_all, race_first, settle_all};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn fetch(name: &'static str, ms: u64) -> Task<String> {
    Task::new(|resolver| {
        let (timer, _handle) = after(Duration::from_millis(ms));
        timer.map(move |()| resolver.resolve(format!("{name} ({ms}ms)")));
    })
}

fn fetch_failing(name: &'static str, ms: u64) -> Task<String> {
    let (timer, _handle) = after(Duration::from_millis(ms));
    timer.on_settle(
        move |()| Err(TaskError::operation(format!("{name} unavailable"))),
        Err,
    )
}

#[pledge::main(name = "promises")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("== basic task ==");
    match fetch("profile", 200).await {
        Ok(value) => println!("resolved: {value}"),
        Err(error) => println!("rejected: {error}"),
    }

    println!("\n== chaining ==");
    let comments = fetch("user", 100)
        .and_then(|user| {
            println!("got {user}, loading posts");
            fetch("posts", 100)
        })
        .and_then(|posts| {
            println!("got {posts}, loading comments");
            fetch_failing("comments", 100)
        })
        .recover(|error| format!("no comments ({error})"))
        .ensure(|| println!("chain finished"));
    println!("result: {}", comments.await.unwrap_or_default());

    println!("\n== join_all ==");
    let all = join_all([fetch("a", 300), fetch("b", 100), fetch("c", 200)]).await;
    println!("values in input order: {all:?}");

    println!("\n== race_first ==");
    let fastest = race_first([fetch("slow", 300), fetch("fast", 50)]).await;
    println!("winner: {fastest:?}");

    println!("\n== settle_all ==");
    let outcomes = settle_all([fetch("ok", 50), fetch_failing("broken", 80)])
        .await
        .unwrap_or_default();
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Outcome::Fulfilled(value) => println!("#{index} fulfilled: {value}"),
            Outcome::Rejected(error) => println!("#{index} rejected: {error}"),
        }
    }
}
