use std::future::Future;
use std::pin::pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Instant;

use super::context::enter_context;
use super::scheduler::Scheduler;
use super::waker::{MAIN, make_waker};
use crate::diagnostics::DiagnosticSink;

/// The main runtime handle.
///
/// `Runtime` is responsible for:
/// - driving tasks, continuations and spawned futures on the current thread,
/// - firing timers in deadline order,
/// - reporting unhandled rejections to the diagnostic sink,
/// - providing a synchronous entry point via [`block_on`](Self::block_on).
///
/// A runtime is not `Send`: everything it drives lives on the thread that
/// created it.
pub struct Runtime {
    /// Queues and timers shared with every task created under this runtime.
    scheduler: Rc<Scheduler>,

    /// Name recorded on the runtime's tracing span.
    name: String,
}

impl Runtime {
    /// Creates a new runtime instance.
    pub(crate) fn new(name: String, sink: Rc<dyn DiagnosticSink>) -> Self {
        Self {
            scheduler: Rc::new(Scheduler::new(sink)),
            name,
        }
    }

    /// Runs a future to completion on the current thread.
    ///
    /// Every [`Task`](crate::Task), timer and cancellation controller used by
    /// the future must be created while this call is running.
    ///
    /// Each loop iteration:
    /// 1. polls woken futures, draining continuations after each poll,
    /// 2. closes the turn: end-of-turn hooks, then unhandled rejections,
    /// 3. fires expired timers, each timer being a turn of its own,
    /// 4. parks until the next timer deadline or wake-up.
    ///
    /// If the future waits on something that can never happen (no timers,
    /// no pending wake-ups), this call parks forever.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let runtime = RuntimeBuilder::new().build();
    /// let value = runtime.block_on(async {
    ///     Task::resolved(42).await
    /// });
    /// assert_eq!(value.unwrap(), 42);
    /// ```
    pub fn block_on<F>(&self, future: F) -> F::Output
    where
        F: Future,
    {
        let span = tracing::debug_span!("runtime", name = %self.name);
        let _entered = span.enter();

        enter_context(self.scheduler.clone(), || {
            let scheduler = &self.scheduler;
            let mut future = pin!(future);

            let waker = make_waker(MAIN, scheduler.ready().clone());
            let mut cx = Context::from_waker(&waker);
            scheduler.ready().push(MAIN);

            let mut output = None;
            let mut turns: u64 = 0;

            loop {
                for id in scheduler.ready().drain() {
                    if id == MAIN {
                        if output.is_none() {
                            if let Poll::Ready(value) = future.as_mut().poll(&mut cx) {
                                output = Some(value);
                            }
                        }
                    } else {
                        scheduler.poll_spawned(id);
                    }
                    scheduler.run_jobs();
                }

                scheduler.end_turn();
                turns += 1;

                turns += scheduler.fire_expired(Instant::now()) as u64;

                if let Some(value) = output {
                    tracing::debug!(
                        turns,
                        spawned = scheduler.spawned_len(),
                        timers = scheduler.pending_timers(),
                        "block_on finished"
                    );
                    return value;
                }

                scheduler.park();
            }
        })
    }
}

impl Drop for Runtime {
    /// Shuts down the runtime.
    ///
    /// Pending continuations, timers and spawned futures are dropped without
    /// running; tasks still pending stay pending forever.
    fn drop(&mut self) {
        self.scheduler.shutdown();
    }
}
