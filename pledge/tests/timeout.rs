use pledge::{
    MemorySink, RetryPolicy, RuntimeBuilder, Task, TaskError, TaskState, after, retry, spawn,
    with_timeout,
};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

fn delayed<T: Clone + 'static>(value: T, ms: u64) -> Task<T> {
    let (timer, _handle) = after(Duration::from_millis(ms));
    timer.map(move |()| value)
}

#[pledge::test]
async fn test_task_settles_before_timeout() {
    let start = Instant::now();

    let result = with_timeout(delayed("done", 10), Duration::from_millis(200)).await;

    assert_eq!(result.unwrap(), "done");
    assert!(start.elapsed() < Duration::from_millis(200));
}

#[test]
fn test_winning_task_leaves_no_late_timeout() {
    let sink = Rc::new(MemorySink::new());
    let rt = RuntimeBuilder::new().diagnostic_sink(sink.clone()).build();

    rt.block_on(async {
        let guarded = with_timeout(delayed("done", 5), Duration::from_millis(20));
        assert_eq!(guarded.clone().await.unwrap(), "done");

        pledge::sleep(Duration::from_millis(50)).await;

        assert!(matches!(guarded.state(), TaskState::Fulfilled("done")));
    });

    assert!(sink.is_empty(), "unexpected diagnostics: {:?}", sink.labels());
}

#[pledge::test]
async fn test_timeout_wins_when_loop_wakes_late() {
    let guarded = with_timeout(delayed("late", 100), Duration::from_millis(50));

    std::thread::sleep(Duration::from_millis(150));

    let result = guarded.await;
    assert!(
        matches!(result, Err(TaskError::Timeout { timeout }) if timeout == Duration::from_millis(50))
    );
}

#[pledge::test]
async fn test_rejection_passes_through_unchanged() {
    let failing = Task::<i32>::rejected(TaskError::operation("boom"));

    let result = with_timeout(failing, Duration::from_millis(50)).await;

    assert!(matches!(result, Err(TaskError::Operation(ref e)) if e.message() == "boom"));
}

#[pledge::test]
async fn test_timeout_cancels_cancellable_task() {
    let released = Rc::new(Cell::new(false));

    let r = released.clone();
    let slow = Task::new(|resolver| {
        let (timer, handle) = after(Duration::from_millis(500));
        resolver.on_cancel(move || {
            handle.cancel();
            r.set(true);
        });
        timer.map(move |()| resolver.resolve("late"));
    });

    let start = Instant::now();
    let result = with_timeout(slow.clone(), Duration::from_millis(20)).await;

    assert!(
        matches!(result, Err(TaskError::Timeout { timeout }) if timeout == Duration::from_millis(20))
    );
    assert!(start.elapsed() < Duration::from_millis(500));
    assert!(released.get(), "timed out task should be cancelled");
    assert!(matches!(slow.state(), TaskState::Rejected(TaskError::Cancelled)));
}

#[pledge::test]
async fn test_non_cancellable_task_keeps_running() {
    let slow = delayed("late", 40);
    assert!(!slow.is_cancellable());

    let result = with_timeout(slow.clone(), Duration::from_millis(10)).await;

    assert!(matches!(result, Err(TaskError::Timeout { .. })));
    assert!(slow.is_pending());
    assert_eq!(slow.await.unwrap(), "late");
}

#[pledge::test]
async fn test_timeout_spawned_future_is_dropped() {
    let finished = Rc::new(Cell::new(false));

    let f = finished.clone();
    let work = spawn(async move {
        pledge::sleep(Duration::from_millis(60)).await;
        f.set(true);
        Ok::<_, TaskError>(())
    });

    let result = with_timeout(work, Duration::from_millis(10)).await;
    assert!(result.unwrap_err().is_timeout());

    pledge::sleep(Duration::from_millis(80)).await;
    assert!(!finished.get());
}

#[pledge::test]
async fn test_timeout_around_retry() {
    let attempts = Rc::new(Cell::new(0));

    let a = attempts.clone();
    let policy = RetryPolicy::new(10)
        .unwrap()
        .fixed_delay(Duration::from_millis(15));
    let retried = retry(
        move || {
            a.set(a.get() + 1);
            Task::<()>::rejected(TaskError::operation("still failing"))
        },
        policy,
    );

    let result = with_timeout(retried, Duration::from_millis(40)).await;
    assert!(matches!(result, Err(TaskError::Timeout { .. })));

    let seen = attempts.get();
    pledge::sleep(Duration::from_millis(60)).await;
    assert_eq!(attempts.get(), seen, "cancelled retry must not start new attempts");
}

#[test]
fn test_unobserved_timeout_is_reported() {
    let sink = Rc::new(MemorySink::new());
    let rt = RuntimeBuilder::new().diagnostic_sink(sink.clone()).build();

    rt.block_on(async {
        let slow = delayed(1, 100);
        let _guarded = with_timeout(slow, Duration::from_millis(5));
        pledge::sleep(Duration::from_millis(20)).await;
    });

    assert_eq!(sink.labels(), vec!["unhandled_rejection"]);
}
