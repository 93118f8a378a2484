//! Settle-once tasks.
//!
//! This module defines the fundamental unit of the runtime:
//! - [`Task`], a deferred computation that settles exactly once,
//! - [`Resolver`], the capability to settle it,
//! - the chaining operators (`map`, `and_then`, `recover`, `or_else`,
//!   `ensure`, `map_err`),
//! - [`spawn`], which turns a future into a task,
//! - [`TaskState`] and [`Outcome`] for inspecting results.

mod chain;
mod core;
mod handle;
mod outcome;
mod resolver;
mod spawn;
mod state;

pub use self::core::Task;
pub use outcome::Outcome;
pub use resolver::Resolver;
pub use spawn::spawn;
pub use state::TaskState;
