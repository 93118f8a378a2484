//! Aggregation combinators.
//!
//! - [`join_all`]: wait for every task, fail fast on the first rejection
//! - [`race_first`]: settle like the first task to settle
//! - [`settle_all`]: wait for every task, collecting each outcome
//!
//! None of them cancels its inputs. Inputs count as handled: a rejection
//! absorbed by a combinator is never reported as unhandled.

mod join;
mod race;
mod settle;

pub use join::join_all;
pub use race::race_first;
pub use settle::settle_all;
