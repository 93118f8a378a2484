use super::resolver::Resolver;
use super::state::TaskState;
use crate::error::TaskError;
use crate::runtime::{Job, RejectionProbe, Scheduler, context};
use crate::sync::cancel::{CancelTarget, CancellationToken};

use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::rc::Rc;
use std::task::Waker;

/// A continuation registered on a task.
pub(crate) type Reaction<T> = Box<dyn FnOnce(Result<T, TaskError>)>;

/// Shared state of a task.
///
/// Every [`Task`] and [`Resolver`] handle points at one `Inner`. The
/// settlement slot is the only mutable state shared between the parties that
/// race to settle a task (its work, timers, cancellation), so `settle` is the
/// single place where the first-settle-wins rule is enforced.
pub(crate) struct Inner<T> {
    /// Current settlement state.
    state: RefCell<TaskState<T>>,

    /// Continuations waiting for settlement, in registration order.
    reactions: RefCell<Vec<Reaction<T>>>,

    /// Wakers of futures awaiting this task.
    pub(crate) wakers: RefCell<Vec<Waker>>,

    /// Whether anything observes the outcome; rejections that stay unhandled
    /// until the end of the turn are reported.
    handled: Cell<bool>,

    /// Release hooks run if the task is cancelled while pending.
    release: RefCell<Vec<Job>>,

    /// Whether the task observes a cancellation token.
    observes_token: Cell<bool>,

    /// Scheduler of the runtime the task was created in.
    scheduler: Rc<Scheduler>,
}

impl<T: Clone + 'static> Inner<T> {
    fn new(scheduler: Rc<Scheduler>) -> Self {
        Self {
            state: RefCell::new(TaskState::Pending),
            reactions: RefCell::new(Vec::new()),
            wakers: RefCell::new(Vec::new()),
            handled: Cell::new(false),
            release: RefCell::new(Vec::new()),
            observes_token: Cell::new(false),
            scheduler,
        }
    }

    /// Returns a copy of the settled result, or `None` while pending.
    pub(crate) fn result(&self) -> Option<Result<T, TaskError>> {
        self.state.borrow().result()
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    pub(crate) fn mark_handled(&self) {
        self.handled.set(true);
    }

    /// Settles the task if it is still pending.
    ///
    /// Returns `false` (and changes nothing) if the task already settled.
    /// Continuations are queued on the scheduler in registration order; they
    /// never run inside this call.
    pub(crate) fn settle(self: &Rc<Self>, result: Result<T, TaskError>) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if !state.is_pending() {
                return false;
            }

            *state = match &result {
                Ok(value) => TaskState::Fulfilled(value.clone()),
                Err(error) => TaskState::Rejected(error.clone()),
            };
        }

        let release = mem::take(&mut *self.release.borrow_mut());
        let reactions = mem::take(&mut *self.reactions.borrow_mut());
        let wakers = mem::take(&mut *self.wakers.borrow_mut());
        drop(release);

        if result.is_err() && !self.handled.get() {
            self.scheduler.track_rejection(self.clone());
        }

        for reaction in reactions {
            let result = result.clone();
            self.scheduler.defer(Box::new(move || reaction(result)));
        }

        for waker in wakers {
            waker.wake();
        }

        true
    }

    /// Registers a continuation, or queues it right away if already settled.
    pub(crate) fn subscribe(&self, reaction: Reaction<T>) {
        match self.result() {
            Some(result) => self.scheduler.defer(Box::new(move || reaction(result))),
            None => self.reactions.borrow_mut().push(reaction),
        }
    }

    /// Adds a release hook; dropped immediately if the task already settled.
    pub(crate) fn add_release(&self, hook: Job) {
        if self.is_pending() {
            self.release.borrow_mut().push(hook);
        }
    }

    fn is_cancellable(&self) -> bool {
        self.observes_token.get() || !self.release.borrow().is_empty()
    }

    /// Settles the task as `Rejected(Cancelled)` and runs its release hooks.
    pub(crate) fn cancel(self: &Rc<Self>) -> bool {
        let hooks = mem::take(&mut *self.release.borrow_mut());

        if !self.settle(Err(TaskError::Cancelled)) {
            return false;
        }

        for hook in hooks {
            hook();
        }
        true
    }
}

impl<T: Clone + 'static> RejectionProbe for Inner<T> {
    fn take_unhandled(&self) -> Option<TaskError> {
        if self.handled.replace(true) {
            return None;
        }

        match &*self.state.borrow() {
            TaskState::Rejected(error) => Some(error.clone()),
            _ => None,
        }
    }
}

impl<T: Clone + 'static> CancelTarget for Inner<T> {
    fn cancel_by_token(self: Rc<Self>) -> bool {
        self.cancel()
    }

    fn is_live(&self) -> bool {
        self.is_pending()
    }
}

/// A deferred computation that settles exactly once.
///
/// A `Task` is a cheap handle: cloning it shares the same settlement state.
/// It can be observed in two ways:
/// - by registering continuations ([`on_settle`](Self::on_settle) and the
///   chaining operators built on it),
/// - by awaiting it; the output is `Result<T, TaskError>`.
///
/// Values are cloned to every observer, hence `T: Clone`.
///
/// Tasks belong to the runtime that was running when they were created and
/// are not `Send`.
pub struct Task<T> {
    pub(crate) inner: Rc<Inner<T>>,
}

impl<T> Clone for Task<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Task<T> {
    /// Creates a task and runs `executor` synchronously with its resolver.
    ///
    /// The executor typically starts some work (a timer, a spawned future)
    /// and hands it the resolver. The first `resolve`/`reject` call settles
    /// the task; later calls are ignored.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a running runtime.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let task = Task::new(|resolver| {
    ///     let (timer, _) = after(Duration::from_millis(10));
    ///     timer.map(move |()| resolver.resolve("done"));
    /// });
    /// ```
    pub fn new<F>(executor: F) -> Self
    where
        F: FnOnce(Resolver<T>),
    {
        let (task, resolver) = Self::pair();
        executor(resolver);
        task
    }

    /// Creates a task that observes `token` for its whole lifetime.
    ///
    /// Cancelling the token settles the task as `Rejected(Cancelled)` and runs
    /// the release hooks registered through [`Resolver::on_cancel`]. If the
    /// token is already cancelled, the task is rejected right away and
    /// `executor` never runs.
    pub fn with_token<F>(token: &CancellationToken, executor: F) -> Self
    where
        F: FnOnce(Resolver<T>),
    {
        let (task, resolver) = Self::pair();
        task.inner.observes_token.set(true);

        if token.is_cancelled() {
            resolver.reject(TaskError::Cancelled);
            return task;
        }

        let target: Rc<dyn CancelTarget> = task.inner.clone();
        token.observe(target);

        executor(resolver);
        task
    }

    /// Creates a task already fulfilled with `value`.
    pub fn resolved(value: T) -> Self {
        Self::new(|resolver| {
            resolver.resolve(value);
        })
    }

    /// Creates a task already rejected with `error`.
    pub fn rejected(error: TaskError) -> Self {
        Self::new(|resolver| {
            resolver.reject(error);
        })
    }

    /// Creates a pending task together with its resolver.
    pub(crate) fn pair() -> (Self, Resolver<T>) {
        let inner = Rc::new(Inner::new(context::current()));
        let resolver = Resolver::new(inner.clone());

        (Self { inner }, resolver)
    }

    /// Returns a snapshot of the settlement state.
    pub fn state(&self) -> TaskState<T> {
        self.inner.state.borrow().clone()
    }

    /// Returns `true` while the task has not settled.
    pub fn is_pending(&self) -> bool {
        self.inner.is_pending()
    }

    /// Returns `true` if cancelling the task would release something: it
    /// observes a token or registered release hooks.
    pub fn is_cancellable(&self) -> bool {
        self.inner.is_cancellable()
    }

    /// Cancels a pending, cancellable task.
    ///
    /// The task settles as `Rejected(Cancelled)` and its release hooks run.
    /// Returns `false` and does nothing if the task already settled or offers
    /// no cancellation hook.
    pub fn cancel(&self) -> bool {
        if !self.inner.is_cancellable() {
            return false;
        }
        self.inner.cancel()
    }

    /// Registers a continuation pair and returns the task it settles.
    ///
    /// Exactly one of the two callbacks runs, on a later scheduler step than
    /// the settlement (or than this call, if the task already settled). The
    /// returned task settles with the callback's result.
    pub fn on_settle<U, F, R>(&self, on_fulfilled: F, on_rejected: R) -> Task<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Result<U, TaskError> + 'static,
        R: FnOnce(TaskError) -> Result<U, TaskError> + 'static,
    {
        let (next, resolver) = Task::pair();

        self.watch(move |result| {
            let result = match result {
                Ok(value) => on_fulfilled(value),
                Err(error) => on_rejected(error),
            };
            resolver.settle(result);
        });

        next
    }

    /// Registers a continuation and marks the task as handled.
    pub(crate) fn watch(&self, reaction: impl FnOnce(Result<T, TaskError>) + 'static) {
        self.inner.mark_handled();
        self.inner.subscribe(Box::new(reaction));
    }

    /// Registers a continuation without marking the task as handled.
    ///
    /// Used for internal bookkeeping that must not hide a rejection the
    /// caller never looked at.
    pub(crate) fn tap(&self, reaction: impl FnOnce(Result<T, TaskError>) + 'static) {
        self.inner.subscribe(Box::new(reaction));
    }

    pub(crate) fn scheduler(&self) -> &Rc<Scheduler> {
        &self.inner.scheduler
    }
}

impl<T: fmt::Debug> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}
