//! Unbounded, homogeneous request lists
//!
//! A [`Query`](crate::Query) is limited to [`MAX_REQUESTS`](crate::MAX_REQUESTS)
//! requests because each one keeps its own result type. When every request produces
//! the same type, a [`Batch`] holds any number of them behind [`BoxedConsumer`] and
//! returns results as a `Vec`, in registration order.
//!
//! Evaluation follows exactly the same rules as a query: one traversal, early stop
//! once every sink is satisfied, and the first failing request (1-based) reported.
//!
//! ```
//! use onepass::reduce::{count, count_where};
//! use onepass::Batch;
//!
//! let thresholds = [10, 20, 30];
//! let mut batch = Batch::new(vec![5, 15, 25, 35]).push(count());
//! for t in thresholds {
//!     batch = batch.push(count_where(move |x: &i32| *x > t));
//! }
//!
//! assert_eq!(batch.len(), 4);
//! assert_eq!(batch.evaluate().unwrap(), vec![4, 3, 2, 1]);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::driver;
use crate::error::EvaluationError;
use crate::sink::{BoxedConsumer, BoxedSink, Consumer};
use crate::source::{Sequence, Source};

/// An immutable list of requests sharing one result type, bound to one source.
pub struct Batch<'a, S: Sequence, R> {
    source: Arc<S>,
    consumers: Vec<BoxedConsumer<'a, S::Item, R>>,
}

impl<'a, S: Sequence, R> Batch<'a, S, R> {
    /// An empty batch over `source`.
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            consumers: Vec::new(),
        }
    }

    /// Return a new batch with `consumer` registered after the existing requests.
    ///
    /// The source and the existing consumers are shared with `self`.
    pub fn push<C>(&self, consumer: C) -> Self
    where
        C: Consumer<S::Item, Output = R> + 'a,
        C::Sink: 'a,
    {
        let mut consumers = Vec::with_capacity(self.consumers.len() + 1);
        consumers.extend(self.consumers.iter().cloned());
        consumers.push(BoxedConsumer::new(consumer));
        Self {
            source: Arc::clone(&self.source),
            consumers,
        }
    }

    /// Number of registered requests.
    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    /// Whether no request has been registered.
    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    /// The source this batch traverses.
    pub fn source(&self) -> &S {
        &self.source
    }

    pub(crate) fn create_slots(&self) -> Vec<BoxedSink<'a, S::Item, R>> {
        self.consumers
            .iter()
            .map(|consumer| consumer.create_sink())
            .collect()
    }
}

impl<S: Source, R> Batch<'_, S, R> {
    /// Traverse the source once and return every request's result.
    ///
    /// An empty batch still opens the source, but pulls nothing from it.
    ///
    /// # Errors
    ///
    /// Same as [`Query::evaluate`](crate::Query::evaluate).
    pub fn evaluate(&self) -> Result<Vec<R>, EvaluationError<S::Error>> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("evaluate", requests = self.len()).entered();

        driver::evaluate(&*self.source, self.create_slots())
    }
}

impl<S: Sequence, R> Clone for Batch<'_, S, R> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            consumers: self.consumers.clone(),
        }
    }
}

impl<S: Sequence, R> fmt::Debug for Batch<'_, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batch")
            .field("source", &"<source>")
            .field("requests", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::reduce::{any, count, try_any};
    use crate::source::from_fn;
    use crate::ReduceError;

    #[test]
    fn test_empty_batch_opens_but_pulls_nothing() {
        let opened = Cell::new(0);
        let pulled = Cell::new(0);
        let (opened, pulled) = (&opened, &pulled);
        let source = from_fn(move || {
            opened.set(opened.get() + 1);
            (1..=3).inspect(move |_| pulled.set(pulled.get() + 1))
        });

        let batch: Batch<'_, _, bool> = Batch::new(&source);

        assert!(batch.is_empty());
        assert_eq!(batch.evaluate().unwrap(), Vec::<bool>::new());
        assert_eq!(opened.get(), 1);
        assert_eq!(pulled.get(), 0);
    }

    #[test]
    fn test_push_is_persistent() {
        let base = Batch::new(vec![1, 2, 3]).push(any(|x: &i32| *x == 3));
        let grown = base.push(any(|x: &i32| *x == 4));

        assert_eq!(base.evaluate().unwrap(), vec![true]);
        assert_eq!(grown.evaluate().unwrap(), vec![true, false]);
        assert!(std::ptr::eq(base.source(), grown.source()));
    }

    #[test]
    fn test_many_requests_beyond_tuple_limit() {
        let mut batch = Batch::new(vec![0_usize, 1, 2]);
        for _ in 0..40 {
            batch = batch.push(count());
        }

        let results = batch.evaluate().unwrap();
        assert_eq!(results.len(), 40);
        assert!(results.iter().all(|n| *n == 3));
    }

    #[test]
    fn test_failure_position_in_batch() {
        let batch = Batch::new(vec![1, 2, 3])
            .push(any(|x: &i32| *x == 9))
            .push(any(|x: &i32| *x == 9))
            .push(try_any(|x: &i32| {
                if *x == 3 {
                    Err("third element rejected")
                } else {
                    Ok(false)
                }
            }));

        let failure = batch.evaluate().unwrap_err().into_failure();
        assert_eq!(failure.position(), 3);
        assert!(matches!(failure.cause(), ReduceError::Callback(_)));
    }

    #[test]
    fn test_debug_reports_len() {
        let batch = Batch::new(vec![1]).push(count()).push(count());
        assert_eq!(
            format!("{:?}", batch),
            "Batch { source: \"<source>\", requests: 2 }"
        );
    }
}
