use pledge::time::{after, sleep, timeout};
use pledge::{TaskError, TaskState, join_all};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[pledge::test]
async fn test_after_fulfills_after_delay() {
    let start = Instant::now();
    let (timer, handle) = after(Duration::from_millis(30));

    assert!(handle.is_pending());
    timer.await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(30));
    assert!(!handle.is_pending());
}

#[pledge::test]
async fn test_zero_delay_is_not_synchronous() {
    let (timer, _handle) = after(Duration::ZERO);

    assert!(timer.is_pending(), "zero-delay timer fires on a later turn");
    timer.await.unwrap();
}

#[pledge::test]
async fn test_timers_fire_in_deadline_then_registration_order() {
    let log = Rc::new(RefCell::new(Vec::new()));

    let delays = [20, 5, 5, 10];
    let observers: Vec<_> = delays
        .iter()
        .enumerate()
        .map(|(i, ms)| {
            let log = log.clone();
            let (timer, _handle) = after(Duration::from_millis(*ms));
            timer.map(move |()| log.borrow_mut().push(i))
        })
        .collect();

    join_all(observers).await.unwrap();

    assert_eq!(*log.borrow(), vec![1, 2, 3, 0]);
}

#[pledge::test]
async fn test_cancelled_timer_never_fires() {
    let (timer, handle) = after(Duration::from_millis(10));

    assert!(handle.cancel());
    assert!(!handle.cancel(), "cancelling twice is a no-op");
    assert!(!handle.is_pending());

    sleep(Duration::from_millis(30)).await;

    assert!(matches!(timer.state(), TaskState::Pending));
}

#[pledge::test]
async fn test_cancel_after_fire_is_noop() {
    let (timer, handle) = after(Duration::from_millis(5));
    timer.clone().await.unwrap();

    assert!(!handle.cancel());
    assert!(timer.state().is_fulfilled());
}

#[pledge::test]
async fn test_dropping_handle_keeps_timer() {
    let (timer, handle) = after(Duration::from_millis(5));
    drop(handle);

    timer.await.unwrap();
}

#[pledge::test]
async fn test_sleep_basic() {
    let start = Instant::now();
    sleep(Duration::from_millis(50)).await;

    assert!(
        start.elapsed() >= Duration::from_millis(50),
        "Sleep should wait at least the specified duration"
    );
}

#[pledge::test]
async fn test_sleep_zero_duration() {
    let start = Instant::now();
    sleep(Duration::ZERO).await;

    assert!(
        start.elapsed() < Duration::from_millis(10),
        "Zero duration sleep should be fast"
    );
}

#[pledge::test]
async fn test_timeout_completes_before_deadline() {
    let result = timeout(Duration::from_millis(50), async {
        sleep(Duration::from_millis(10)).await;
        123
    })
    .await;

    assert!(matches!(result, Ok(123)));
}

#[pledge::test]
async fn test_timeout_expires() {
    let result = timeout(Duration::from_millis(20), async {
        sleep(Duration::from_millis(100)).await;
        456
    })
    .await;

    assert!(
        matches!(result, Err(TaskError::Timeout { timeout }) if timeout == Duration::from_millis(20)),
        "Timeout should return an error when deadline is exceeded"
    );
}
