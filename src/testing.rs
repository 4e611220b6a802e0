//! Testing utilities for code built on onepass
//!
//! [`CountingSource`] is an instrumented source that records how often it was
//! opened, how many elements were pulled, and whether every cursor was released.
//! The assertion macros check evaluation results without a wall of `match`.
//!
//! # Examples
//!
//! ## Counting traversals
//!
//! ```rust
//! use onepass::reduce::{any, count};
//! use onepass::testing::CountingSource;
//! use onepass::SourceExt;
//!
//! let source = CountingSource::new(vec![1, 2, 3, 4, 5]);
//!
//! let (found, n) = (&source)
//!     .request(any(|x: &i32| *x == 2))
//!     .and(count())
//!     .evaluate()
//!     .unwrap();
//!
//! assert_eq!((found, n), (true, 5));
//! assert_eq!(source.opened(), 1);
//! assert_eq!(source.pulled(), 5);
//! assert_eq!(source.released(), 1);
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use onepass::reduce::{count, first};
//! use onepass::{assert_evaluated, assert_request_failed, SourceExt};
//!
//! assert_evaluated!(vec![1, 2].request(count()).evaluate(), (2,));
//! assert_request_failed!(Vec::<i32>::new().request(count()).and(first()).evaluate(), 2);
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::stream;

use crate::source::{Cursor, Sequence, Source};
use crate::stream::StreamSource;

/// The failure a [`CountingSource`] injects when configured to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFault {
    /// Number of elements yielded before the failure.
    pub after: usize,
}

impl fmt::Display for SourceFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source failed after {} elements", self.after)
    }
}

impl StdError for SourceFault {}

/// An in-memory source that counts opens, pulls, and cursor releases.
///
/// Works as both a blocking [`Source`] and a [`StreamSource`]. Counters are atomic,
/// so the source can be shared across threads.
#[derive(Debug, Default)]
pub struct CountingSource<T> {
    items: Vec<T>,
    fail_after: Option<usize>,
    opened: AtomicUsize,
    pulled: AtomicUsize,
    released: AtomicUsize,
}

impl<T> CountingSource<T> {
    /// Yield `items` on every traversal.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            fail_after: None,
            opened: AtomicUsize::new(0),
            pulled: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    /// Fail with [`SourceFault`] after yielding `n` elements.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Number of traversals started.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Total elements yielded across all traversals.
    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }

    /// Number of cursors dropped.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Cursors opened but not yet released.
    pub fn in_flight(&self) -> usize {
        self.opened() - self.released()
    }

    fn start(&self) -> CountingCursor<'_, T> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        CountingCursor {
            source: self,
            position: 0,
        }
    }
}

/// Cursor handed out by [`CountingSource`]; counts itself released on drop.
#[derive(Debug)]
pub struct CountingCursor<'a, T> {
    source: &'a CountingSource<T>,
    position: usize,
}

impl<T: Clone> Iterator for CountingCursor<'_, T> {
    type Item = Result<T, SourceFault>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.source.fail_after == Some(self.position) {
            return Some(Err(SourceFault {
                after: self.position,
            }));
        }
        let item = self.source.items.get(self.position)?.clone();
        self.position += 1;
        self.source.pulled.fetch_add(1, Ordering::SeqCst);
        Some(Ok(item))
    }
}

impl<T: Clone> Cursor for CountingCursor<'_, T> {
    type Item = T;
    type Error = SourceFault;

    fn try_next(&mut self) -> Result<Option<T>, SourceFault> {
        self.next().transpose()
    }
}

impl<T> Drop for CountingCursor<'_, T> {
    fn drop(&mut self) {
        self.source.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T> Sequence for CountingSource<T> {
    type Item = T;
    type Error = SourceFault;
}

impl<T: Clone> Source for CountingSource<T> {
    type Cursor<'a>
        = CountingCursor<'a, T>
    where
        Self: 'a;

    fn open(&self) -> Result<CountingCursor<'_, T>, SourceFault> {
        Ok(self.start())
    }
}

impl<T: Clone> StreamSource for CountingSource<T> {
    type Stream<'a>
        = stream::Iter<CountingCursor<'a, T>>
    where
        Self: 'a;

    fn open(&self) -> Self::Stream<'_> {
        stream::iter(self.start())
    }
}

/// Assert that an evaluation failed at a given 1-based request position.
///
/// An optional pattern is matched against the [`ReduceError`](crate::ReduceError)
/// cause.
///
/// # Example
///
/// ```rust
/// use onepass::reduce::{count, single};
/// use onepass::{assert_request_failed, ReduceError, SourceExt};
///
/// let result = vec![1, 2].request(count()).and(single()).evaluate();
/// assert_request_failed!(result, 2, ReduceError::MoreThanOne);
/// ```
#[macro_export]
macro_rules! assert_request_failed {
    ($result:expr, $position:expr) => {
        match $result {
            Err($crate::EvaluationError::Request(failure)) => {
                assert_eq!(
                    failure.position(),
                    $position,
                    "Expected request {} to fail, got: {}",
                    $position,
                    failure
                );
            }
            Err($crate::EvaluationError::Source(e)) => {
                panic!(
                    "Expected request {} to fail, got source failure: {:?}",
                    $position, e
                );
            }
            Ok(v) => {
                panic!("Expected request {} to fail, got Ok: {:?}", $position, v);
            }
        }
    };
    ($result:expr, $position:expr, $cause:pat) => {
        match $result {
            Err($crate::EvaluationError::Request(failure)) => {
                assert_eq!(
                    failure.position(),
                    $position,
                    "Expected request {} to fail, got: {}",
                    $position,
                    failure
                );
                assert!(
                    matches!(failure.cause(), $cause),
                    "Unexpected cause: {}",
                    failure.cause()
                );
            }
            Err($crate::EvaluationError::Source(e)) => {
                panic!(
                    "Expected request {} to fail, got source failure: {:?}",
                    $position, e
                );
            }
            Ok(v) => {
                panic!("Expected request {} to fail, got Ok: {:?}", $position, v);
            }
        }
    };
}

/// Assert that an evaluation succeeded with the expected results.
///
/// # Example
///
/// ```rust
/// use onepass::reduce::{max, min};
/// use onepass::{assert_evaluated, SourceExt};
///
/// assert_evaluated!(vec![3, 9, 1].request(min()).and(max()).evaluate(), (1, 9));
/// ```
#[macro_export]
macro_rules! assert_evaluated {
    ($result:expr, $expected:expr) => {
        match $result {
            Ok(results) => assert_eq!(results, $expected),
            Err(e) => panic!("Expected evaluation to succeed, got: {:?}", e),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce::{count, first, to_vec};
    use crate::{EvaluationError, ReduceError, SourceExt};

    #[test]
    fn test_counts_each_traversal() {
        let source = CountingSource::new(vec!['a', 'b']);
        let q = (&source).request(count());

        q.evaluate().unwrap();
        q.evaluate().unwrap();

        assert_eq!(source.opened(), 2);
        assert_eq!(source.pulled(), 4);
        assert_eq!(source.released(), 2);
        assert_eq!(source.in_flight(), 0);
    }

    #[test]
    fn test_injected_fault_releases_cursor() {
        let source = CountingSource::new(vec![1, 2, 3]).failing_after(2);

        let err = (&source).request(to_vec()).evaluate().unwrap_err();

        assert!(matches!(err, EvaluationError::Source(SourceFault { after: 2 })));
        assert_eq!(source.pulled(), 2);
        assert_eq!(source.in_flight(), 0);
    }

    #[test]
    fn test_fault_beyond_short_circuit_is_never_seen() {
        let source = CountingSource::new(vec![1, 2, 3]).failing_after(2);

        let (head,) = (&source).request(first()).evaluate().unwrap();

        assert_eq!(head, 1);
        assert_eq!(source.pulled(), 1);
    }

    #[test]
    fn test_assert_request_failed_with_pattern() {
        let source = CountingSource::new(Vec::<i32>::new());
        assert_request_failed!(
            (&source).request(count()).and(first()).evaluate(),
            2,
            ReduceError::Empty
        );
    }

    #[test]
    #[should_panic(expected = "Expected request 1 to fail")]
    fn test_assert_request_failed_panics_on_success() {
        assert_request_failed!(vec![1].request(count()).evaluate(), 1);
    }

    #[test]
    #[should_panic(expected = "Expected evaluation to succeed")]
    fn test_assert_evaluated_panics_on_failure() {
        assert_evaluated!(Vec::<i32>::new().request(first()).evaluate(), (0,));
    }

    #[tokio::test]
    async fn test_stream_counts_release() {
        let source = CountingSource::new(vec![5, 6, 7]);

        let (items,) = (&source).request(to_vec()).evaluate_async().await.unwrap();

        assert_eq!(items, vec![5, 6, 7]);
        assert_eq!(source.opened(), 1);
        assert_eq!(source.in_flight(), 0);
    }
}
