//! Core runtime components.
//!
//! This module contains the single-threaded scheduler that every other
//! primitive is built on. It is responsible for:
//! - running task continuations on a later step than the call that queued them,
//! - driving futures spawned with [`task::spawn`],
//! - keeping the timer queue and firing timers in deadline order,
//! - closing each scheduler turn (race tie-breaks, unhandled rejections).
//!
//! Most users interact with [`Runtime`] and the higher-level APIs built on
//! top of it rather than with this module directly.

mod core;
mod scheduler;
mod timer;
mod waker;

pub(crate) mod builder;
pub(crate) mod context;

pub mod task;

pub use self::core::Runtime;

pub(crate) use scheduler::{Job, RejectionProbe, Scheduler};
pub(crate) use timer::TimerSlot;
