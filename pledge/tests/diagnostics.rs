use pledge::{
    Diagnostic, DiagnosticSink, MemorySink, RuntimeBuilder, Task, TaskError, after, sleep,
};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

fn run_with_sink<F: std::future::Future>(future: F) -> (F::Output, Rc<MemorySink>) {
    let sink = Rc::new(MemorySink::new());
    let rt = RuntimeBuilder::new().diagnostic_sink(sink.clone()).build();

    let output = rt.block_on(future);
    (output, sink)
}

#[test]
fn test_unhandled_rejection_reported_once() {
    let ((), sink) = run_with_sink(async {
        let _orphan = Task::<i32>::rejected(TaskError::operation("nobody listens"));
        sleep(Duration::from_millis(10)).await;
    });

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        Diagnostic::UnhandledRejection { error: TaskError::Operation(e) } if e.message() == "nobody listens"
    ));
}

#[test]
fn test_rejection_handled_in_same_turn_is_not_reported() {
    let (value, sink) = run_with_sink(async {
        let failed = Task::<i32>::rejected(TaskError::operation("boom"));
        let recovered = failed.recover(|_| -1);
        sleep(Duration::from_millis(5)).await;
        recovered.await
    });

    assert_eq!(value.unwrap(), -1);
    assert!(sink.is_empty());
}

#[test]
fn test_rejection_awaited_after_turn_is_still_reported() {
    let (result, sink) = run_with_sink(async {
        let failed = Task::<i32>::rejected(TaskError::operation("late"));
        sleep(Duration::from_millis(5)).await;
        failed.await
    });

    assert!(result.is_err());
    assert_eq!(sink.labels(), vec!["unhandled_rejection"]);
}

#[test]
fn test_rejection_from_timer_reported() {
    let ((), sink) = run_with_sink(async {
        let (timer, _handle) = after(Duration::from_millis(5));
        let _failed = timer.on_settle(|()| Err::<(), _>(TaskError::operation("expired")), Err);
        sleep(Duration::from_millis(20)).await;
    });

    assert_eq!(sink.labels(), vec!["unhandled_rejection"]);
}

#[test]
fn test_fulfilled_tasks_report_nothing() {
    let (value, sink) = run_with_sink(async {
        let (timer, _handle) = after(Duration::from_millis(1));
        timer.map(|()| 5).await
    });

    assert_eq!(value.unwrap(), 5);
    assert!(sink.is_empty());
}

#[test]
fn test_custom_sink() {
    struct Counting(Rc<Cell<usize>>);

    impl DiagnosticSink for Counting {
        fn report(&self, _event: &Diagnostic) {
            self.0.set(self.0.get() + 1);
        }
    }

    let count = Rc::new(Cell::new(0));
    let rt = RuntimeBuilder::new()
        .diagnostic_sink(Counting(count.clone()))
        .build();

    rt.block_on(async {
        let _a = Task::<()>::rejected(TaskError::Cancelled);
        let _b = Task::<()>::rejected(TaskError::Cancelled);
        sleep(Duration::from_millis(1)).await;
    });

    assert_eq!(count.get(), 2);
}

#[test]
fn test_default_log_sink_does_not_panic() {
    let rt = RuntimeBuilder::new().build();

    rt.block_on(async {
        let _orphan = Task::<()>::rejected(TaskError::operation("logged"));
        sleep(Duration::from_millis(1)).await;
    });
}
