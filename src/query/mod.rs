//! Request holders: many reductions, one traversal
//!
//! A [`Query`] binds an ordered list of consumers to one source. Start one with
//! [`query`] or [`SourceExt::request`], add more with [`Query::and`], and run them
//! all with [`Query::evaluate`].
//!
//! ```
//! use onepass::reduce::{any, count, sequence_equal};
//! use onepass::SourceExt;
//!
//! let readings = vec![1, 2, 3, 4, 5];
//!
//! let (has_two, n, same) = readings
//!     .request(any(|x: &i32| *x == 2))
//!     .and(count())
//!     .and(sequence_equal(vec![1, 2, 3, 4, 5]))
//!     .evaluate()
//!     .unwrap();
//!
//! assert!(has_two);
//! assert_eq!(n, 5);
//! assert!(same);
//! ```
//!
//! # Holders are persistent
//!
//! [`Query::and`] borrows the holder and returns a larger one; the source and the
//! consumers already registered are shared, not copied. Every holder stays usable.
//!
//! ```
//! use onepass::reduce::{count, sum};
//! use onepass::SourceExt;
//!
//! let counted = vec![3, 4].request(count());
//! let summed = counted.and(sum());
//!
//! assert_eq!(counted.evaluate().unwrap(), (2,));
//! assert_eq!(summed.evaluate().unwrap(), (2, 7));
//! ```
//!
//! # Arity
//!
//! Results come back as a tuple, so the number of requests is part of the type. At
//! most [`MAX_REQUESTS`] requests fit in one holder; calling `and` on a full holder
//! does not compile. Use [`Batch`](crate::Batch) for an unbounded, homogeneous list.
//!
//! ```compile_fail
//! use onepass::reduce::count;
//! use onepass::SourceExt;
//!
//! let full = vec![1]
//!     .request(count())
//!     .and(count()).and(count()).and(count()).and(count()).and(count())
//!     .and(count()).and(count()).and(count()).and(count()).and(count())
//!     .and(count()).and(count()).and(count()).and(count()).and(count());
//! assert_eq!(full.len(), 16);
//!
//! let too_many = full.and(count());
//! ```
//!
//! # Evaluation
//!
//! Each call to [`Query::evaluate`] opens the source once, drives every sink in a
//! single traversal, and assembles results in registration order. Nothing is cached
//! between calls.

use std::fmt;
use std::sync::Arc;

use crate::driver::{self, SlotList};
use crate::error::EvaluationError;
use crate::sink::Consumer;
use crate::source::{Sequence, Source};

mod tuples;

/// The largest number of requests a single [`Query`] can hold.
pub const MAX_REQUESTS: usize = 16;

/// Number of requests in a request tuple.
pub trait Arity {
    /// The number of requests.
    const LEN: usize;
}

/// A tuple of shared consumers that can be evaluated against elements of type `T`.
///
/// Implemented for `(Arc<C1>, ..., Arc<CN>)` for every `N` up to [`MAX_REQUESTS`].
pub trait Requests<T>: Arity {
    /// Tuple of every consumer's result, in registration order.
    type Output;

    /// The slot tuple driven during one evaluation.
    type Slots: SlotList<T, Output = Self::Output>;

    /// Create one fresh sink per consumer, in registration order.
    fn create_slots(&self) -> Self::Slots;
}

/// A request tuple that can grow by one consumer.
///
/// Implemented for request tuples shorter than [`MAX_REQUESTS`].
pub trait Append<N> {
    /// The request tuple with `N` added at the end.
    type Appended;

    /// Share the existing consumers and add `next` at the end.
    fn append(&self, next: Arc<N>) -> Self::Appended;
}

/// An immutable, ordered set of requests bound to one source.
pub struct Query<S, C> {
    source: Arc<S>,
    requests: C,
}

/// Start a query with its first request.
///
/// ```
/// use onepass::query;
/// use onepass::reduce::max;
///
/// let (largest,) = query(vec![4, 9, 2], max()).evaluate().unwrap();
/// assert_eq!(largest, 9);
/// ```
pub fn query<S, C>(source: S, consumer: C) -> Query<S, (Arc<C>,)>
where
    S: Sequence,
    C: Consumer<S::Item>,
{
    Query {
        source: Arc::new(source),
        requests: (Arc::new(consumer),),
    }
}

impl<S: Sequence, C> Query<S, C> {
    /// Return a new holder with `consumer` registered after the existing requests.
    ///
    /// The source and the existing consumers are shared with `self`.
    pub fn and<N>(&self, consumer: N) -> Query<S, C::Appended>
    where
        N: Consumer<S::Item>,
        C: Append<N>,
    {
        Query {
            source: Arc::clone(&self.source),
            requests: self.requests.append(Arc::new(consumer)),
        }
    }

    /// The source this query traverses.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The shared consumers, in registration order.
    pub fn requests(&self) -> &C {
        &self.requests
    }
}

impl<S, C: Arity> Query<S, C> {
    /// Number of registered requests.
    pub fn len(&self) -> usize {
        C::LEN
    }

    /// Always `false`: a query is created with its first request.
    ///
    /// ```
    /// use onepass::reduce::count;
    /// use onepass::SourceExt;
    ///
    /// assert!(!vec![1].request(count()).is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl<S, C> Query<S, C>
where
    S: Source,
    C: Requests<S::Item>,
{
    /// Traverse the source once and return every request's result.
    ///
    /// # Errors
    ///
    /// - [`EvaluationError::Source`] if the source fails to open or to advance.
    /// - [`EvaluationError::Request`] naming the request whose reduction failed.
    ///   A request that rejects an element stops the traversal at once and is
    ///   reported without finishing any other request. Otherwise results are
    ///   assembled in registration order and the first failing one is reported.
    pub fn evaluate(&self) -> Result<C::Output, EvaluationError<S::Error>> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("evaluate", requests = C::LEN).entered();

        driver::evaluate(&*self.source, self.requests.create_slots())
    }
}

impl<S, C: Clone> Clone for Query<S, C> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            requests: self.requests.clone(),
        }
    }
}

impl<S, C: Arity> fmt::Debug for Query<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("source", &"<source>")
            .field("requests", &C::LEN)
            .finish()
    }
}

/// Start queries directly from a source or stream source.
pub trait SourceExt: Sequence + Sized {
    /// Start a query on this source with its first request.
    ///
    /// ```
    /// use onepass::reduce::{all, min};
    /// use onepass::SourceExt;
    ///
    /// let (positive, smallest) = vec![3, 1, 2]
    ///     .request(all(|x: &i32| *x > 0))
    ///     .and(min())
    ///     .evaluate()
    ///     .unwrap();
    ///
    /// assert!(positive);
    /// assert_eq!(smallest, 1);
    /// ```
    fn request<C>(self, consumer: C) -> Query<Self, (Arc<C>,)>
    where
        C: Consumer<Self::Item>,
    {
        query(self, consumer)
    }
}

impl<S: Sequence> SourceExt for S {}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::reduce::{any, count, first, fold, sum, to_vec, try_any, ConsumerExt};
    use crate::source::from_fn;
    use crate::ReduceError;

    #[test]
    fn test_single_request() {
        let (n,) = vec![1, 2, 3].request(count()).evaluate().unwrap();
        assert_eq!(n, 3);
    }

    #[test]
    fn test_results_follow_registration_order() {
        let q = vec![1, 2, 3]
            .request(sum())
            .and(count())
            .and(to_vec());

        let (total, n, items) = q.evaluate().unwrap();
        assert_eq!(total, 6);
        assert_eq!(n, 3);
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_len_tracks_arity() {
        let one = vec![1].request(count());
        let two = one.and(sum());
        let three = two.and(to_vec());

        assert_eq!(one.len(), 1);
        assert_eq!(two.len(), 2);
        assert_eq!(three.len(), 3);
        assert!(!one.is_empty());
    }

    #[test]
    fn test_and_shares_consumers() {
        let one = vec![1, 2].request(count());
        let two = one.and(sum());

        assert!(Arc::ptr_eq(&one.requests().0, &two.requests().0));
        assert!(std::ptr::eq(one.source(), two.source()));
    }

    #[test]
    fn test_prior_holder_still_evaluates() {
        let base = vec![5, 6].request(sum());
        let extended = base.and(count());
        let branched = base.and(first());

        assert_eq!(base.evaluate().unwrap(), (11,));
        assert_eq!(extended.evaluate().unwrap(), (11, 2));
        assert_eq!(branched.evaluate().unwrap(), (11, 5));
    }

    #[test]
    fn test_any_with_count_still_traverses_everything() {
        let pulled = Cell::new(0);
        let pulled = &pulled;
        let source = from_fn(move || (1..=5).inspect(move |_| pulled.set(pulled.get() + 1)));

        let result = (&source)
            .request(any(|x: &i32| *x == 2))
            .and(count())
            .evaluate()
            .unwrap();

        assert_eq!(result, (true, 5));
        assert_eq!(pulled.get(), 5);
    }

    #[test]
    fn test_two_anys_stop_at_match() {
        let pulled = Cell::new(0);
        let pulled = &pulled;
        let source = from_fn(move || (1..=5).inspect(move |_| pulled.set(pulled.get() + 1)));

        let result = (&source)
            .request(any(|x: &i32| *x == 2))
            .and(any(|x: &i32| *x == 1))
            .evaluate()
            .unwrap();

        assert_eq!(result, (true, true));
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn test_error_names_position_and_skips_later_requests() {
        let third_finished = Cell::new(false);

        let err = vec![1, 2, 3]
            .request(count())
            .and(try_any(|x: &i32| {
                if *x == 2 {
                    Err("predicate exploded")
                } else {
                    Ok(false)
                }
            }))
            .and(fold(0, |acc: i32, x: &i32| acc + x).map(|total| {
                third_finished.set(true);
                total
            }))
            .evaluate()
            .unwrap_err();

        assert_eq!(err.position(), Some(2));
        let failure = err.into_failure();
        assert!(matches!(failure.cause(), ReduceError::Callback(_)));
        assert_eq!(failure.cause().to_string(), "callback failed: predicate exploded");
        assert!(!third_finished.get());
    }

    #[test]
    fn test_debug_reports_arity() {
        let q = vec![1].request(count()).and(sum());
        assert_eq!(format!("{:?}", q), "Query { source: \"<source>\", requests: 2 }");
    }

    #[cfg(feature = "tracing")]
    #[tracing_test::traced_test]
    #[test]
    fn test_traces_traversal_summary() {
        vec![1, 2, 3].request(count()).and(first()).evaluate().unwrap();

        assert!(logs_contain("traversal complete"));
        assert!(logs_contain("pulled=3"));
        assert!(logs_contain("short_circuited=false"));
    }

    #[test]
    fn test_clone_shares_source() {
        let q = vec![1, 2].request(count());
        let cloned = q.clone();
        assert!(std::ptr::eq(q.source(), cloned.source()));
        assert_eq!(cloned.evaluate().unwrap(), (2,));
    }
}
