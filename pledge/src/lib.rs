//! # Pledge
//!
//! **Pledge** is a single-threaded task coordination library for Rust, built
//! for the **Nebula** ecosystem.
//!
//! It models deferred work as settle-once [`Task`]s and provides the
//! primitives needed to coordinate them on one thread:
//!
//! - **Tasks** that settle exactly once, with chaining operators and
//!   `await` support
//! - **Timers** ([`after`], [`sleep`]) fired in deadline order
//! - **Cancellation** through a [`CancellationController`] and its tokens
//! - **Timeouts** ([`with_timeout`], [`timeout`]) and **retries** ([`retry`])
//!   with fixed, exponential or custom delays
//! - **Combinators** ([`join_all`], [`race_first`], [`settle_all`]) and the
//!   `join!` macro
//! - **Diagnostics**: unhandled rejections, failed retry attempts and
//!   cancellations are reported to a pluggable [`DiagnosticSink`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pledge::{Task, TaskError, after, with_timeout};
//! use std::time::Duration;
//!
//! #[pledge::main]
//! async fn main() {
//!     let data = Task::new(|resolver| {
//!         let (timer, _) = after(Duration::from_millis(100));
//!         timer.map(move |()| resolver.resolve("payload"));
//!     });
//!
//!     match with_timeout(data, Duration::from_secs(1)).await {
//!         Ok(value) => println!("received {value}"),
//!         Err(TaskError::Timeout { timeout }) => println!("no answer after {timeout:?}"),
//!         Err(error) => println!("failed: {error}"),
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`task`]: Tasks, resolvers and spawning
//! - [`time`]: Timers, sleep and timeouts
//! - [`sync`]: Cancellation controller and token
//! - [`tools`]: Retry executor and policies
//! - [`combinator`]: Aggregation over many tasks
//! - [`diagnostics`]: Diagnostic events and sinks
//! - [`error`]: Error types
//!
//! ## Getting Started
//!
//! Add Pledge to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! pledge = { git = "https://github.com/Nebula-ecosystem/Pledge", package = "pledge" }
//! ```

mod runtime;
mod utils;

pub mod combinator;
pub mod diagnostics;
pub mod error;
pub mod sync;
pub mod time;
pub mod tools;

pub use runtime::Runtime;
pub use runtime::builder::RuntimeBuilder;
pub use runtime::task;
pub use runtime::task::{Outcome, Resolver, Task, TaskState, spawn};

pub use combinator::{join_all, race_first, settle_all};
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink, MemorySink};
pub use error::{OperationError, PolicyError, TaskError};
pub use sync::{CancellationController, CancellationToken, cancellation};
pub use time::{TimerHandle, after, sleep, timeout, with_timeout};
pub use tools::{BackoffPolicy, Delay, RetryPolicy, retry};

pub use pledge_macros::*;
