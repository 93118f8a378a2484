use pledge::{
    MemorySink, Outcome, Resolver, RuntimeBuilder, Task, TaskError, after, join_all, race_first,
    settle_all,
};
use std::rc::Rc;
use std::time::{Duration, Instant};

fn delayed<T: Clone + 'static>(value: T, ms: u64) -> Task<T> {
    let (timer, _handle) = after(Duration::from_millis(ms));
    timer.map(move |()| value)
}

fn failing<T: Clone + 'static>(message: &'static str, ms: u64) -> Task<T> {
    let (timer, _handle) = after(Duration::from_millis(ms));
    timer.on_settle(move |()| Err(TaskError::operation(message)), Err)
}

fn pending<T: Clone + 'static>() -> (Task<T>, Resolver<T>) {
    let mut slot = None;
    let task = Task::new(|resolver| slot = Some(resolver));
    (task, slot.unwrap())
}

fn message(error: &TaskError) -> &str {
    match error {
        TaskError::Operation(e) => e.message(),
        other => other.as_label(),
    }
}

#[pledge::test]
async fn test_join_all_keeps_input_order() {
    let values = join_all([delayed(1, 30), delayed(2, 10), Task::resolved(3)])
        .await
        .unwrap();

    assert_eq!(values, vec![1, 2, 3]);
}

#[pledge::test]
async fn test_join_all_empty() {
    let values = join_all(Vec::<Task<i32>>::new()).await.unwrap();
    assert!(values.is_empty());
}

#[pledge::test]
async fn test_join_all_fails_fast() {
    let start = Instant::now();

    let result = join_all([delayed(1, 100), failing("second failed", 10)]).await;

    assert_eq!(message(&result.unwrap_err()), "second failed");
    assert!(start.elapsed() < Duration::from_millis(100));
}

#[pledge::test]
async fn test_join_all_first_rejection_by_settle_time() {
    let result = join_all([
        failing::<i32>("late failure", 40),
        failing::<i32>("early failure", 10),
    ])
    .await;

    assert_eq!(message(&result.unwrap_err()), "early failure");
}

#[pledge::test]
async fn test_race_first_fastest_wins() {
    let slow = delayed("slow", 40);

    let winner = race_first([slow.clone(), delayed("fast", 5)]).await.unwrap();

    assert_eq!(winner, "fast");
    assert!(slow.is_pending(), "losers are not cancelled");
    assert_eq!(slow.await.unwrap(), "slow");
}

#[pledge::test]
async fn test_race_first_rejection_wins() {
    let result = race_first([delayed(1, 50), failing("fast failure", 5)]).await;

    assert_eq!(message(&result.unwrap_err()), "fast failure");
}

#[pledge::test]
async fn test_race_first_earlier_deadline_wins_after_late_wakeup() {
    let slow = delayed("slow", 100);
    let fast = failing::<&str>("fast failure", 50);

    std::thread::sleep(Duration::from_millis(150));

    let result = race_first([slow, fast]).await;
    assert_eq!(message(&result.unwrap_err()), "fast failure");
}

#[pledge::test]
async fn test_race_tie_goes_to_earliest_input() {
    let (first, resolve_first) = pending::<&str>();
    let (second, resolve_second) = pending::<&str>();

    let raced = race_first([first, second]);

    resolve_second.resolve("second");
    resolve_first.resolve("first");

    assert_eq!(raced.await.unwrap(), "first");
}

#[pledge::test]
async fn test_race_first_already_settled_inputs() {
    let winner = race_first([Task::resolved(1), Task::resolved(2)]).await;
    assert_eq!(winner.unwrap(), 1);
}

#[pledge::test]
async fn test_race_first_empty_rejects() {
    let result = race_first(Vec::<Task<i32>>::new()).await;

    assert!(matches!(result, Err(TaskError::Operation(_))));
}

#[pledge::test]
async fn test_settle_all_collects_outcomes_in_order() {
    let outcomes = settle_all([
        delayed(1, 20),
        failing("broken", 5),
        Task::resolved(3),
    ])
    .await
    .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].value(), Some(&1));
    assert!(outcomes[1].is_rejected());
    assert_eq!(message(outcomes[1].error().unwrap()), "broken");
    assert!(matches!(outcomes[2], Outcome::Fulfilled(3)));
}

#[pledge::test]
async fn test_settle_all_empty() {
    let outcomes = settle_all(Vec::<Task<()>>::new()).await.unwrap();
    assert!(outcomes.is_empty());
}

#[test]
fn test_absorbed_rejections_are_not_reported() {
    let sink = Rc::new(MemorySink::new());
    let rt = RuntimeBuilder::new().diagnostic_sink(sink.clone()).build();

    rt.block_on(async {
        let outcomes = settle_all([
            Task::<i32>::rejected(TaskError::operation("a")),
            failing("b", 5),
        ])
        .await
        .unwrap();
        assert!(outcomes.iter().all(Outcome::is_rejected));

        let joined = join_all([Task::<i32>::rejected(TaskError::operation("c"))]).await;
        assert!(joined.is_err());
    });

    assert!(sink.is_empty(), "unexpected diagnostics: {:?}", sink.events());
}
