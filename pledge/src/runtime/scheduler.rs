use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::Context;
use std::time::Instant;

use super::timer::{TimerQueue, TimerSlot};
use super::waker::{ReadyQueue, make_waker};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::TaskError;
use crate::utils::slab::Slab;

/// A unit of deferred work: a continuation, a timer callback or a turn hook.
pub(crate) type Job = Box<dyn FnOnce()>;

type LocalFuture = Pin<Box<dyn Future<Output = ()>>>;

/// A rejected task that may still be handled before the turn ends.
pub(crate) trait RejectionProbe {
    /// Returns the rejection if nothing handled it, marking it reported.
    fn take_unhandled(&self) -> Option<TaskError>;
}

/// A future spawned onto the runtime.
///
/// `future` is `None` while the future is being polled, so that polling may
/// spawn or abort other futures without holding a borrow on the slab.
struct Spawned {
    future: Option<LocalFuture>,
    aborted: bool,
}

/// Single-threaded scheduler state.
///
/// The scheduler owns every queue the runtime drives:
/// - the continuation queue, drained after every step of a turn,
/// - the timer queue,
/// - hooks that run once the continuation queue of a turn is empty,
/// - rejections waiting for the end-of-turn unhandled check,
/// - futures spawned with [`spawn`](crate::task::spawn).
pub(crate) struct Scheduler {
    jobs: RefCell<VecDeque<Job>>,
    turn_end: RefCell<Vec<Job>>,
    timers: RefCell<TimerQueue>,
    rejections: RefCell<Vec<Rc<dyn RejectionProbe>>>,
    futures: RefCell<Slab<Spawned>>,
    ready: Arc<ReadyQueue>,
    sink: Rc<dyn DiagnosticSink>,
}

impl Scheduler {
    pub(crate) fn new(sink: Rc<dyn DiagnosticSink>) -> Self {
        Self {
            jobs: RefCell::new(VecDeque::new()),
            turn_end: RefCell::new(Vec::new()),
            timers: RefCell::new(TimerQueue::default()),
            rejections: RefCell::new(Vec::new()),
            futures: RefCell::new(Slab::new(16)),
            ready: Arc::new(ReadyQueue::new()),
            sink,
        }
    }

    pub(crate) fn ready(&self) -> &Arc<ReadyQueue> {
        &self.ready
    }

    /// Queues a continuation; it runs after the current step, never inside it.
    pub(crate) fn defer(&self, job: Job) {
        self.jobs.borrow_mut().push_back(job);
    }

    /// Queues a hook that runs once the current turn has no continuations left.
    pub(crate) fn at_turn_end(&self, job: Job) {
        self.turn_end.borrow_mut().push(job);
    }

    /// Registers a timer callback due at `deadline`.
    pub(crate) fn schedule_timer(&self, deadline: Instant, callback: Job) -> TimerSlot {
        self.timers.borrow_mut().push(deadline, callback)
    }

    /// Hands `event` to the diagnostic sink.
    pub(crate) fn report(&self, event: Diagnostic) {
        tracing::debug!(label = event.as_label(), "diagnostic reported");
        self.sink.report(&event);
    }

    /// Remembers a rejection for the end-of-turn unhandled check.
    pub(crate) fn track_rejection(&self, probe: Rc<dyn RejectionProbe>) {
        self.rejections.borrow_mut().push(probe);
    }

    /// Adds `future` to the set of spawned futures and schedules a first poll.
    pub(crate) fn spawn_local<F>(&self, future: F) -> usize
    where
        F: Future<Output = ()> + 'static,
    {
        let id = self.futures.borrow_mut().insert(Spawned {
            future: Some(Box::pin(future)),
            aborted: false,
        });
        self.ready.push(id);

        tracing::trace!(id, "future spawned");
        id
    }

    /// Drops spawned future `id` without polling it again.
    pub(crate) fn abort(&self, id: usize) {
        let removed = {
            let mut futures = self.futures.borrow_mut();
            match futures.get_mut(id) {
                Some(spawned) if spawned.future.is_none() => {
                    spawned.aborted = true;
                    None
                }
                Some(_) => futures.remove(id),
                None => None,
            }
        };

        if removed.is_some() {
            tracing::trace!(id, "spawned future aborted");
        }
        drop(removed);
    }

    /// Polls spawned future `id` once.
    pub(crate) fn poll_spawned(&self, id: usize) {
        let future = self
            .futures
            .borrow_mut()
            .get_mut(id)
            .and_then(|spawned| spawned.future.take());

        let Some(mut future) = future else {
            return;
        };

        let waker = make_waker(id, self.ready.clone());
        let mut cx = Context::from_waker(&waker);
        let poll = future.as_mut().poll(&mut cx);

        let finished = {
            let mut futures = self.futures.borrow_mut();
            match futures.get_mut(id) {
                Some(spawned) if poll.is_pending() && !spawned.aborted => {
                    spawned.future = Some(future);
                    None
                }
                Some(_) => {
                    futures.remove(id);
                    Some(future)
                }
                None => Some(future),
            }
        };
        drop(finished);
    }

    /// Runs queued continuations until the queue is empty.
    pub(crate) fn run_jobs(&self) {
        loop {
            let job = self.jobs.borrow_mut().pop_front();
            match job {
                Some(job) => job(),
                None => break,
            }
        }
    }

    /// Fires every timer due at `now`, in deadline order.
    ///
    /// Each timer callback is a turn of its own: its continuations, turn hooks
    /// and unhandled-rejection check all complete before the next timer fires,
    /// so a settlement caused by an earlier deadline is never tied with one
    /// caused by a later deadline.
    pub(crate) fn fire_expired(&self, now: Instant) -> usize {
        let mut fired = 0;

        loop {
            let entry = self.timers.borrow_mut().pop_expired(now);
            let Some(entry) = entry else {
                break;
            };

            let callback = entry.slot.borrow_mut().take();
            if let Some(callback) = callback {
                callback();
                fired += 1;
                self.end_turn();
            }
        }

        if fired > 0 {
            tracing::trace!(fired, "timers fired");
        }
        fired
    }

    /// Closes the current turn.
    ///
    /// Turn hooks run until none are left (each batch followed by the
    /// continuations it produced); then every tracked rejection that is still
    /// unhandled is reported exactly once.
    pub(crate) fn end_turn(&self) {
        loop {
            self.run_jobs();

            let hooks = mem::take(&mut *self.turn_end.borrow_mut());
            if hooks.is_empty() {
                break;
            }
            for hook in hooks {
                hook();
            }
        }

        let probes = mem::take(&mut *self.rejections.borrow_mut());
        for probe in probes {
            if let Some(error) = probe.take_unhandled() {
                self.report(Diagnostic::UnhandledRejection { error });
            }
        }
    }

    /// Returns `true` if the next turn has work without waiting.
    fn has_immediate_work(&self) -> bool {
        !self.jobs.borrow().is_empty()
            || !self.turn_end.borrow().is_empty()
            || !self.ready.is_empty()
    }

    /// Blocks until a waker fires or the next timer is due.
    pub(crate) fn park(&self) {
        if self.has_immediate_work() {
            return;
        }

        let deadline = self.timers.borrow_mut().next_deadline();
        self.ready.park_until(deadline);
    }

    /// Number of timers still due to fire.
    pub(crate) fn pending_timers(&self) -> usize {
        self.timers.borrow().live()
    }

    /// Number of spawned futures still alive.
    pub(crate) fn spawned_len(&self) -> usize {
        self.futures.borrow().len()
    }

    /// Drops all pending work.
    ///
    /// Queued closures hold tasks, and tasks hold the scheduler, so the queues
    /// are emptied explicitly to break those cycles.
    pub(crate) fn shutdown(&self) {
        let jobs = mem::take(&mut *self.jobs.borrow_mut());
        let hooks = mem::take(&mut *self.turn_end.borrow_mut());
        let timers = self.timers.borrow_mut().drain();
        let rejections = mem::take(&mut *self.rejections.borrow_mut());
        let futures = self.futures.borrow_mut().drain();

        let slots: Vec<_> = timers
            .into_iter()
            .filter_map(|entry| {
                let callback = entry.slot.borrow_mut().take();
                callback
            })
            .collect();

        tracing::debug!(
            jobs = jobs.len(),
            timers = slots.len(),
            futures = futures.len(),
            "scheduler shut down"
        );

        drop((jobs, hooks, slots, rejections, futures));
    }
}
