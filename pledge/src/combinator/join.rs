use crate::task::Task;

use std::cell::RefCell;
use std::rc::Rc;

/// Values collected so far, indexed like the inputs.
struct Joined<T> {
    values: Vec<Option<T>>,
    remaining: usize,
}

/// Waits for every task to fulfill.
///
/// The returned task fulfills with the values in input order, regardless of
/// the order in which the inputs settled. The first input to reject (in
/// settlement order) rejects it immediately with that error; later
/// settlements are ignored and the other inputs keep running.
///
/// An empty input fulfills with an empty vector.
///
/// # Examples
///
/// ```rust,ignore
/// let values = join_all([fetch("a"), fetch("b"), fetch("c")]).await?;
/// assert_eq!(values.len(), 3);
/// ```
pub fn join_all<T, I>(tasks: I) -> Task<Vec<T>>
where
    T: Clone + 'static,
    I: IntoIterator<Item = Task<T>>,
{
    let tasks: Vec<Task<T>> = tasks.into_iter().collect();
    if tasks.is_empty() {
        return Task::resolved(Vec::new());
    }

    let (joined, resolver) = Task::pair();
    let state = Rc::new(RefCell::new(Joined {
        values: tasks.iter().map(|_| None).collect(),
        remaining: tasks.len(),
    }));

    for (index, task) in tasks.iter().enumerate() {
        let state = state.clone();
        let resolver = resolver.clone();

        task.watch(move |result| {
            if resolver.is_settled() {
                return;
            }

            let value = match result {
                Ok(value) => value,
                Err(error) => {
                    resolver.reject(error);
                    return;
                }
            };

            let values = {
                let mut state = state.borrow_mut();
                state.values[index] = Some(value);
                state.remaining -= 1;

                if state.remaining > 0 {
                    return;
                }
                std::mem::take(&mut state.values)
            };

            resolver.resolve(values.into_iter().flatten().collect());
        });
    }

    joined
}
