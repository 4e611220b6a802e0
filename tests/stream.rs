//! Integration tests for async evaluation over streams.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use onepass::reduce::{any, average, count, first, sequence_equal, to_vec, try_any};
use onepass::testing::{CountingSource, SourceFault};
use onepass::{assert_request_failed, stream, Batch, EvaluationError, ReduceError, SourceExt};

#[tokio::test]
async fn async_and_blocking_agree() {
    let source = CountingSource::new(vec![2.0_f64, 4.0, 9.0]);

    let blocking = (&source).request(count()).and(average()).evaluate().unwrap();
    let streamed = (&source)
        .request(count())
        .and(average())
        .evaluate_async()
        .await
        .unwrap();

    assert_eq!(blocking, streamed);
    assert_eq!(source.opened(), 2);
    assert_eq!(source.in_flight(), 0);
}

#[tokio::test]
async fn slow_stream_stops_polling_once_satisfied() {
    let produced = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&produced);

    let ticks = stream::from_fn(move || {
        let counter = Arc::clone(&counter);
        futures::stream::iter(0..)
            .then(|n| async move {
                tokio::time::sleep(Duration::from_millis(1)).await;
                n
            })
            .inspect(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
    });

    let (head, saw_three) = ticks
        .request(first())
        .and(any(|n: &u64| *n == 3))
        .evaluate_async()
        .await
        .unwrap();

    assert_eq!(head, 0);
    assert!(saw_three);
    assert_eq!(produced.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn stream_failure_is_a_source_error() {
    let source = CountingSource::new(vec!["a", "b", "c"]).failing_after(2);

    let err = (&source)
        .request(to_vec())
        .evaluate_async()
        .await
        .unwrap_err();

    assert!(matches!(err, EvaluationError::Source(SourceFault { after: 2 })));
    assert_eq!(source.in_flight(), 0);
}

#[tokio::test]
async fn stream_errors_from_try_from_fn() {
    let lines = stream::try_from_fn(|| {
        futures::stream::iter(vec![Ok("a".to_string()), Err(std::io::Error::other("reset"))])
    });

    let err = lines.request(count()).evaluate_async().await.unwrap_err();

    assert!(err.is_source());
    assert_eq!(err.to_string(), "source failed: reset");
}

#[tokio::test]
async fn stream_request_attribution() {
    let result = vec![1, 2, 3]
        .request(sequence_equal([1, 2, 3]))
        .and(try_any(|x: &i32| {
            if *x == 3 {
                Err("three")
            } else {
                Ok(false)
            }
        }))
        .evaluate_async()
        .await;

    assert_request_failed!(result, 2, ReduceError::Callback(_));
}

#[tokio::test]
async fn rejected_element_stops_polling() {
    let source = CountingSource::new(vec![1, 2, 3, 4, 5]).failing_after(3);

    let result = (&source)
        .request(count())
        .and(try_any(|x: &i32| {
            if *x == 2 {
                Err("two")
            } else {
                Ok(false)
            }
        }))
        .evaluate_async()
        .await;

    assert_request_failed!(result, 2, ReduceError::Callback(_));
    assert_eq!(source.pulled(), 2);
    assert_eq!(source.in_flight(), 0);
}

#[tokio::test]
async fn batch_over_a_stream() {
    let source = CountingSource::new((1..=10).collect::<Vec<i32>>());
    let batch = Batch::new(&source)
        .push(any(|x: &i32| *x == 3))
        .push(any(|x: &i32| *x == 6));

    assert_eq!(batch.evaluate_async().await.unwrap(), vec![true, true]);
    assert_eq!(source.pulled(), 6);
}

#[test]
fn any_executor_can_drive_evaluation() {
    let (n,) = tokio_test::block_on(vec!['x', 'y'].request(count()).evaluate_async()).unwrap();
    assert_eq!(n, 2);
}
