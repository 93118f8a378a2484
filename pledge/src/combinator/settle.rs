use crate::task::{Outcome, Task};

use std::cell::RefCell;
use std::rc::Rc;

/// Waits for every task to settle, whatever the outcome.
///
/// The returned task always fulfills, with one [`Outcome`] per input in
/// input order. An empty input fulfills with an empty vector.
///
/// # Examples
///
/// ```rust,ignore
/// let outcomes = settle_all([fetch("a"), fetch("b")]).await?;
/// for outcome in outcomes {
///     match outcome {
///         Outcome::Fulfilled(value) => println!("ok: {value}"),
///         Outcome::Rejected(error) => println!("failed: {error}"),
///     }
/// }
/// ```
pub fn settle_all<T, I>(tasks: I) -> Task<Vec<Outcome<T>>>
where
    T: Clone + 'static,
    I: IntoIterator<Item = Task<T>>,
{
    let tasks: Vec<Task<T>> = tasks.into_iter().collect();
    if tasks.is_empty() {
        return Task::resolved(Vec::new());
    }

    let (settled, resolver) = Task::pair();
    let outcomes: Rc<RefCell<Vec<Option<Outcome<T>>>>> =
        Rc::new(RefCell::new(tasks.iter().map(|_| None).collect()));
    let remaining = Rc::new(RefCell::new(tasks.len()));

    for (index, task) in tasks.iter().enumerate() {
        let outcomes = outcomes.clone();
        let remaining = remaining.clone();
        let resolver = resolver.clone();

        task.watch(move |result| {
            outcomes.borrow_mut()[index] = Some(Outcome::from(result));

            let left = {
                let mut remaining = remaining.borrow_mut();
                *remaining -= 1;
                *remaining
            };

            if left == 0 {
                let outcomes = std::mem::take(&mut *outcomes.borrow_mut());
                resolver.resolve(outcomes.into_iter().flatten().collect());
            }
        });
    }

    settled
}
