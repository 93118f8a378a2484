use pledge::{
    CancellationController, Diagnostic, MemorySink, RuntimeBuilder, Task, TaskError, TaskState,
    after, cancellation, sleep, spawn, timeout,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

#[pledge::test]
async fn test_cancel_rejects_observing_task() {
    let (token, controller) = cancellation();
    let released = Rc::new(Cell::new(false));

    let r = released.clone();
    let task = Task::with_token(&token, |resolver| {
        let (timer, handle) = after(Duration::from_secs(3));
        resolver.on_cancel(move || {
            handle.cancel();
            r.set(true);
        });
        timer.map(move |()| resolver.resolve("finished"));
    });

    assert!(task.is_pending());
    assert!(controller.cancel());

    assert!(released.get(), "release hooks run during cancel");
    assert!(matches!(task.state(), TaskState::Rejected(TaskError::Cancelled)));
    assert!(matches!(task.await, Err(TaskError::Cancelled)));
}

#[pledge::test]
async fn test_cancel_reaches_task_with_no_remaining_handle() {
    let (token, controller) = cancellation();

    let chained = Task::<u32>::with_token(&token, |_resolver| {}).map(|value| value + 1);
    assert!(controller.cancel());

    let result = timeout(Duration::from_millis(200), chained).await;
    assert!(matches!(result, Ok(Err(TaskError::Cancelled))));
}

#[pledge::test]
async fn test_cancel_is_idempotent() {
    let controller = CancellationController::new();
    let token = controller.token();

    assert!(!token.is_cancelled());
    assert!(controller.cancel());
    assert!(!controller.cancel());
    assert!(token.is_cancelled());
    assert!(controller.is_cancelled());
}

#[pledge::test]
async fn test_already_cancelled_token_skips_executor() {
    let (token, controller) = cancellation();
    controller.cancel();

    let ran = Cell::new(false);
    let task = Task::<()>::with_token(&token, |_resolver| ran.set(true));

    assert!(!ran.get());
    assert!(matches!(task.await, Err(TaskError::Cancelled)));
}

#[pledge::test]
async fn test_observers_cancelled_in_creation_order() {
    let (token, controller) = cancellation();
    let order = Rc::new(RefCell::new(Vec::new()));

    let tasks: Vec<Task<u8>> = (0..3)
        .map(|i| {
            let order = order.clone();
            Task::with_token(&token, move |resolver| {
                resolver.on_cancel(move || order.borrow_mut().push(i));
            })
        })
        .collect();

    controller.cancel();

    assert_eq!(*order.borrow(), vec![0, 1, 2]);
    for task in tasks {
        assert!(matches!(task.await, Err(TaskError::Cancelled)));
    }
}

#[pledge::test]
async fn test_settled_task_ignores_cancellation() {
    let (token, controller) = cancellation();

    let done = Task::with_token(&token, |resolver| {
        resolver.resolve(5);
    });

    controller.cancel();

    assert_eq!(done.await.unwrap(), 5);
}

#[pledge::test]
async fn test_release_hook_dropped_on_normal_settle() {
    let released = Rc::new(Cell::new(false));

    let r = released.clone();
    let task = Task::new(|resolver| {
        resolver.on_cancel(move || r.set(true));
        resolver.resolve("ok");
    });

    assert!(!task.cancel(), "settled task cannot be cancelled");
    assert_eq!(task.await.unwrap(), "ok");
    assert!(!released.get());
}

#[pledge::test]
async fn test_cancelled_future_resolves_on_cancel() {
    let (token, controller) = cancellation();

    let waiter = spawn(async move {
        token.cancelled().await;
        Ok::<_, TaskError>("woken")
    });

    sleep(Duration::from_millis(5)).await;
    assert!(waiter.is_pending());

    controller.cancel();

    assert_eq!(waiter.await.unwrap(), "woken");
}

#[test]
fn test_cancellation_reported_with_observer_count() {
    let sink = Rc::new(MemorySink::new());
    let rt = RuntimeBuilder::new().diagnostic_sink(sink.clone()).build();

    rt.block_on(async {
        let (token, controller) = cancellation();

        let pending_a = Task::<i32>::with_token(&token, |_resolver| {});
        let pending_b = Task::<i32>::with_token(&token, |_resolver| {});
        let settled = Task::with_token(&token, |resolver| {
            resolver.resolve(1);
        });

        controller.cancel();
        controller.cancel();

        assert!(pending_a.await.is_err());
        assert!(pending_b.await.is_err());
        assert_eq!(settled.await.unwrap(), 1);
    });

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        Diagnostic::OperationCancelled { observers: 2 }
    ));
}
