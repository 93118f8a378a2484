use super::Task;
use crate::error::TaskError;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

impl<T: Clone + 'static> Future for Task<T> {
    /// The settled result of the task.
    type Output = Result<T, TaskError>;

    /// Polls the task.
    ///
    /// If the task has already settled, a copy of its result is returned
    /// immediately. Otherwise the current waker is registered and the future
    /// returns `Poll::Pending`. Polling counts as handling a rejection.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let inner = &self.inner;
        inner.mark_handled();

        if let Some(result) = inner.result() {
            return Poll::Ready(result);
        }

        let mut wakers = inner.wakers.borrow_mut();
        if !wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
            wakers.push(cx.waker().clone());
        }

        Poll::Pending
    }
}
