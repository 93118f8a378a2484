use crate::error::TaskError;
use crate::task::Task;

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

/// Settles like the first task to settle.
///
/// Inputs that settle during the same scheduler turn are tied; the tie goes
/// to the earliest input. The decision is taken once the turn has no
/// continuations left, so a task settled in a continuation of the same turn
/// still counts as a candidate.
///
/// Losing inputs are ignored, not cancelled.
///
/// An empty input has nothing to race and rejects with an
/// [`Operation`](TaskError::Operation) error.
///
/// # Examples
///
/// ```rust,ignore
/// let fastest = race_first([fetch("fast"), fetch("slow")]).await?;
/// ```
pub fn race_first<T, I>(tasks: I) -> Task<T>
where
    T: Clone + 'static,
    I: IntoIterator<Item = Task<T>>,
{
    let tasks: Vec<Task<T>> = tasks.into_iter().collect();
    if tasks.is_empty() {
        return Task::rejected(TaskError::operation("race_first called with no tasks"));
    }

    let (raced, resolver) = Task::pair();
    let scheduler = raced.scheduler().clone();
    let candidates = Rc::new(RefCell::new(Vec::new()));

    for (index, task) in tasks.iter().enumerate() {
        let candidates = candidates.clone();
        let resolver = resolver.clone();
        let scheduler = scheduler.clone();

        task.watch(move |result| {
            if resolver.is_settled() {
                return;
            }

            let first = {
                let mut candidates = candidates.borrow_mut();
                candidates.push((index, result));
                candidates.len() == 1
            };

            if !first {
                return;
            }

            scheduler.at_turn_end(Box::new(move || {
                let settled = mem::take(&mut *candidates.borrow_mut());
                let winner = settled.into_iter().min_by_key(|(index, _)| *index);

                if let Some((index, result)) = winner {
                    tracing::trace!(winner = index, "race decided");
                    resolver.settle(result);
                }
            }));
        });
    }

    raced
}
