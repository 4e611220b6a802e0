//! Element-wise comparison against an expected sequence.

use std::sync::Arc;

use super::callback;
use super::predicate::{PlainFn, TryFn};
use crate::error::{BoxError, ReduceError};
use crate::sink::{Consumer, Sink};

/// Decides whether two elements are equal.
///
/// A comparer only affects element comparison; sequences of different lengths are
/// never equal.
pub trait ElementComparer<T> {
    /// Compare an element of the source with the expected element.
    fn equal(&self, actual: &T, expected: &T) -> Result<bool, ReduceError>;
}

/// Compare with [`PartialEq`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UsePartialEq;

impl<T: PartialEq> ElementComparer<T> for UsePartialEq {
    fn equal(&self, actual: &T, expected: &T) -> Result<bool, ReduceError> {
        Ok(actual == expected)
    }
}

impl<T, F> ElementComparer<T> for PlainFn<F>
where
    F: Fn(&T, &T) -> bool,
{
    fn equal(&self, actual: &T, expected: &T) -> Result<bool, ReduceError> {
        Ok((self.0)(actual, expected))
    }
}

impl<T, E, F> ElementComparer<T> for TryFn<F>
where
    F: Fn(&T, &T) -> Result<bool, E>,
    E: Into<BoxError>,
{
    fn equal(&self, actual: &T, expected: &T) -> Result<bool, ReduceError> {
        callback((self.0)(actual, expected))
    }
}

/// Whether the source equals an expected sequence.
///
/// Created by [`sequence_equal`], [`sequence_equal_by`] and [`try_sequence_equal_by`].
pub struct SequenceEqual<T, C> {
    expected: Arc<[T]>,
    comparer: Arc<C>,
}

/// Sink for [`SequenceEqual`]; stops at the first difference.
pub struct SequenceEqualSink<T, C> {
    expected: Arc<[T]>,
    comparer: Arc<C>,
    position: usize,
    mismatch: bool,
}

opaque_debug!(SequenceEqual<T, C>);
opaque_debug!(SequenceEqualSink<T, C>);

/// `true` if the source yields exactly the elements of `expected`, in order.
///
/// ```
/// use onepass::reduce::sequence_equal;
/// use onepass::SourceExt;
///
/// let (same, shorter, longer) = vec![1, 2, 3]
///     .request(sequence_equal([1, 2, 3]))
///     .and(sequence_equal([1, 2]))
///     .and(sequence_equal([1, 2, 3, 4]))
///     .evaluate()
///     .unwrap();
///
/// assert!(same);
/// assert!(!shorter);
/// assert!(!longer);
/// ```
pub fn sequence_equal<T, I>(expected: I) -> SequenceEqual<T, UsePartialEq>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    SequenceEqual {
        expected: expected.into_iter().collect(),
        comparer: Arc::new(UsePartialEq),
    }
}

/// Like [`sequence_equal`], comparing elements with `eq`.
pub fn sequence_equal_by<T, I, F>(expected: I, eq: F) -> SequenceEqual<T, PlainFn<F>>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T, &T) -> bool,
{
    SequenceEqual {
        expected: expected.into_iter().collect(),
        comparer: Arc::new(PlainFn(eq)),
    }
}

/// Like [`sequence_equal_by`], with a comparer that may fail.
pub fn try_sequence_equal_by<T, I, E, F>(expected: I, eq: F) -> SequenceEqual<T, TryFn<F>>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T, &T) -> Result<bool, E>,
    E: Into<BoxError>,
{
    SequenceEqual {
        expected: expected.into_iter().collect(),
        comparer: Arc::new(TryFn(eq)),
    }
}

impl<T, C: ElementComparer<T>> Consumer<T> for SequenceEqual<T, C> {
    type Output = bool;
    type Sink = SequenceEqualSink<T, C>;

    fn create_sink(&self) -> Self::Sink {
        SequenceEqualSink {
            expected: Arc::clone(&self.expected),
            comparer: Arc::clone(&self.comparer),
            position: 0,
            mismatch: false,
        }
    }
}

impl<T, C: ElementComparer<T>> Sink<T> for SequenceEqualSink<T, C> {
    type Output = bool;

    fn wants_more(&self) -> bool {
        !self.mismatch
    }

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        self.mismatch = match self.expected.get(self.position) {
            Some(expected) => !self.comparer.equal(item, expected)?,
            None => true,
        };
        self.position += 1;
        Ok(())
    }

    fn finish(self) -> Result<bool, ReduceError> {
        Ok(!self.mismatch && self.position == self.expected.len())
    }
}
