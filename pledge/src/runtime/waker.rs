use std::collections::VecDeque;
use std::mem;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{RawWaker, RawWakerVTable, Waker};
use std::thread::{self, Thread};
use std::time::Instant;

/// Identifier reserved for the future driven by `block_on`.
pub(crate) const MAIN: usize = usize::MAX;

/// Queue of woken future identifiers.
///
/// This is the only piece of the runtime that other threads may touch: a
/// [`Waker`] can be sent anywhere, so waking pushes an identifier under a
/// mutex and unparks the runtime thread.
pub(crate) struct ReadyQueue {
    queue: Mutex<VecDeque<usize>>,
    thread: Thread,
}

impl ReadyQueue {
    /// Creates a queue that unparks the calling thread on wake-up.
    pub(crate) fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            thread: thread::current(),
        }
    }

    /// Marks future `id` as ready to be polled.
    pub(crate) fn push(&self, id: usize) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(id);
        self.thread.unpark();
    }

    /// Takes every ready identifier, dropping duplicates but keeping the
    /// order of first wake-up.
    pub(crate) fn drain(&self) -> Vec<usize> {
        let drained = mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner));

        let mut ids = Vec::with_capacity(drained.len());
        for id in drained {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Parks the runtime thread until a wake-up or `deadline`.
    ///
    /// Without a deadline the thread parks until some waker fires.
    pub(crate) fn park_until(&self, deadline: Option<Instant>) {
        if !self.is_empty() {
            return;
        }

        match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if deadline > now {
                    thread::park_timeout(deadline - now);
                }
            }
            None => thread::park(),
        }
    }
}

/// Waker payload: which future to reschedule, and where.
struct Notifier {
    id: usize,
    ready: Arc<ReadyQueue>,
}

/// The `RawWakerVTable` used by every runtime waker.
///
/// # Safety
///
/// All functions in the vtable receive a pointer produced by
/// `Arc::<Notifier>::into_raw` and keep the reference count balanced.
static VTABLE: RawWakerVTable = RawWakerVTable::new(clone_raw, wake_raw, wake_by_ref_raw, drop_raw);

/// Creates a [`Waker`] that reschedules future `id` on `ready`.
pub(crate) fn make_waker(id: usize, ready: Arc<ReadyQueue>) -> Waker {
    let notifier = Arc::new(Notifier { id, ready });

    // SAFETY: the pointer comes from `Arc::into_raw` and the vtable only
    // reinterprets it as `Arc<Notifier>`.
    unsafe { Waker::from_raw(RawWaker::new(Arc::into_raw(notifier) as *const (), &VTABLE)) }
}

fn clone_raw(ptr: *const ()) -> RawWaker {
    let arc = unsafe { Arc::<Notifier>::from_raw(ptr as *const Notifier) };
    let cloned = arc.clone();
    mem::forget(arc);

    RawWaker::new(Arc::into_raw(cloned) as *const (), &VTABLE)
}

fn wake_raw(ptr: *const ()) {
    let arc = unsafe { Arc::<Notifier>::from_raw(ptr as *const Notifier) };
    arc.ready.push(arc.id);
}

fn wake_by_ref_raw(ptr: *const ()) {
    let arc = unsafe { Arc::<Notifier>::from_raw(ptr as *const Notifier) };
    arc.ready.push(arc.id);
    mem::forget(arc);
}

fn drop_raw(ptr: *const ()) {
    unsafe { drop(Arc::<Notifier>::from_raw(ptr as *const Notifier)) };
}
