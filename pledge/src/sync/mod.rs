//! Synchronization primitives.
//!
//! - [`CancellationController`] / [`CancellationToken`] split the capability
//!   to cancel from the capability to observe cancellation.

pub(crate) mod cancel;

#[doc(inline)]
pub use cancel::{CancellationController, CancellationToken, WaitForCancellation, cancellation};
