//! Time utilities.
//!
//! This module provides timer-driven primitives that integrate with the
//! runtime timer queue.
//!
//! It includes:
//! - [`after`] for task-based one-shot timers,
//! - [`sleep`] for awaiting a duration inside async code,
//! - [`with_timeout`] and [`timeout`] for bounding execution time.

mod after;
mod sleep;
mod timeout;

#[doc(inline)]
pub use after::{TimerHandle, after};

#[doc(inline)]
pub use sleep::{Sleep, sleep};

#[doc(inline)]
pub use timeout::{Timeout, timeout, with_timeout};
