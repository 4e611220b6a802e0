//! Sinks and consumers
//!
//! A [`Consumer`] is an immutable, reusable description of a reduction: "count the
//! elements", "is any element even", "does the sequence equal `[1, 2, 3]`". Each
//! evaluation asks every consumer for a fresh [`Sink`], which holds the running state
//! of that reduction for exactly one traversal.
//!
//! # Contract
//!
//! - [`Consumer::create_sink`] never fails and never looks at the source.
//! - [`Sink::accept`] is only called while [`Sink::wants_more`] returns true, with
//!   elements in the order the source yields them.
//! - [`Sink::finish`] consumes the sink, so it runs at most once.
//! - A sink whose `accept` fails receives no further elements; its error is reported
//!   at its position when results are assembled.
//!
//! # Writing a consumer
//!
//! ```
//! use onepass::{Consumer, ReduceError, Sink, SourceExt};
//!
//! /// Sum of the first `n` elements.
//! struct HeadSum(usize);
//!
//! struct HeadSumSink {
//!     remaining: usize,
//!     total: i64,
//! }
//!
//! impl Sink<i64> for HeadSumSink {
//!     type Output = i64;
//!
//!     fn wants_more(&self) -> bool {
//!         self.remaining > 0
//!     }
//!
//!     fn accept(&mut self, item: &i64) -> Result<(), ReduceError> {
//!         self.remaining -= 1;
//!         self.total += item;
//!         Ok(())
//!     }
//!
//!     fn finish(self) -> Result<i64, ReduceError> {
//!         Ok(self.total)
//!     }
//! }
//!
//! impl Consumer<i64> for HeadSum {
//!     type Output = i64;
//!     type Sink = HeadSumSink;
//!
//!     fn create_sink(&self) -> HeadSumSink {
//!         HeadSumSink { remaining: self.0, total: 0 }
//!     }
//! }
//!
//! let (total,) = vec![5_i64, 6, 7].request(HeadSum(2)).evaluate().unwrap();
//! assert_eq!(total, 11);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::ReduceError;

/// Single-use, stateful accumulator for one reduction during one traversal.
pub trait Sink<T> {
    /// The result of the reduction.
    type Output;

    /// Whether this sink still needs input to determine its result.
    ///
    /// Once this returns false it must keep returning false.
    fn wants_more(&self) -> bool {
        true
    }

    /// Consume the next element of the sequence.
    fn accept(&mut self, item: &T) -> Result<(), ReduceError>;

    /// Produce the final result once traversal has ended.
    fn finish(self) -> Result<Self::Output, ReduceError>;
}

/// Reusable description of a reduction; a factory for [`Sink`]s.
pub trait Consumer<T> {
    /// The result of the reduction.
    type Output;

    /// The sink type this consumer creates.
    type Sink: Sink<T, Output = Self::Output>;

    /// Create a fresh sink for one evaluation.
    fn create_sink(&self) -> Self::Sink;
}

impl<T, C> Consumer<T> for Arc<C>
where
    C: Consumer<T> + ?Sized,
{
    type Output = C::Output;
    type Sink = C::Sink;

    fn create_sink(&self) -> Self::Sink {
        (**self).create_sink()
    }
}

impl<T, C> Consumer<T> for &C
where
    C: Consumer<T> + ?Sized,
{
    type Output = C::Output;
    type Sink = C::Sink;

    fn create_sink(&self) -> Self::Sink {
        (**self).create_sink()
    }
}

/// Object-safe form of [`Sink`], used when sinks are stored behind a pointer.
///
/// Implemented for every [`Sink`]; not meant to be implemented directly.
pub trait DynSink<T, R> {
    /// See [`Sink::wants_more`].
    fn dyn_wants_more(&self) -> bool;

    /// See [`Sink::accept`].
    fn dyn_accept(&mut self, item: &T) -> Result<(), ReduceError>;

    /// See [`Sink::finish`].
    fn finish_boxed(self: Box<Self>) -> Result<R, ReduceError>;
}

impl<T, S> DynSink<T, S::Output> for S
where
    S: Sink<T>,
{
    fn dyn_wants_more(&self) -> bool {
        Sink::wants_more(self)
    }

    fn dyn_accept(&mut self, item: &T) -> Result<(), ReduceError> {
        Sink::accept(self, item)
    }

    fn finish_boxed(self: Box<Self>) -> Result<S::Output, ReduceError> {
        Sink::finish(*self)
    }
}

/// A type-erased sink with result type `R`.
pub struct BoxedSink<'a, T, R> {
    inner: Box<dyn DynSink<T, R> + 'a>,
}

impl<T, R> fmt::Debug for BoxedSink<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedSink")
            .field("wants_more", &self.inner.dyn_wants_more())
            .finish()
    }
}

impl<T, R> Sink<T> for BoxedSink<'_, T, R> {
    type Output = R;

    fn wants_more(&self) -> bool {
        self.inner.dyn_wants_more()
    }

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        self.inner.dyn_accept(item)
    }

    fn finish(self) -> Result<R, ReduceError> {
        self.inner.finish_boxed()
    }
}

/// Object-safe form of [`Consumer`].
///
/// Implemented for every [`Consumer`] whose sink outlives `'a`.
pub trait DynConsumer<'a, T, R> {
    /// Create a fresh type-erased sink.
    fn create_boxed(&self) -> BoxedSink<'a, T, R>;
}

impl<'a, T, C> DynConsumer<'a, T, C::Output> for C
where
    C: Consumer<T>,
    C::Sink: 'a,
{
    fn create_boxed(&self) -> BoxedSink<'a, T, C::Output> {
        BoxedSink {
            inner: Box::new(self.create_sink()),
        }
    }
}

/// A shared, type-erased consumer with result type `R`.
///
/// Cloning is cheap: clones share the same underlying consumer.
pub struct BoxedConsumer<'a, T, R> {
    inner: Arc<dyn DynConsumer<'a, T, R> + 'a>,
}

impl<'a, T, R> BoxedConsumer<'a, T, R> {
    /// Erase the concrete type of `consumer`.
    ///
    /// ```
    /// use onepass::reduce::{count, count_where};
    /// use onepass::{BoxedConsumer, SourceExt};
    ///
    /// let requests: Vec<BoxedConsumer<'_, i32, usize>> = vec![
    ///     BoxedConsumer::new(count()),
    ///     BoxedConsumer::new(count_where(|x: &i32| x % 2 == 0)),
    /// ];
    ///
    /// let source = vec![1, 2, 3, 4];
    /// let (all, even) = source
    ///     .request(requests[0].clone())
    ///     .and(requests[1].clone())
    ///     .evaluate()
    ///     .unwrap();
    /// assert_eq!((all, even), (4, 2));
    /// ```
    pub fn new<C>(consumer: C) -> Self
    where
        C: Consumer<T, Output = R> + 'a,
        C::Sink: 'a,
    {
        Self {
            inner: Arc::new(consumer),
        }
    }
}

impl<T, R> Clone for BoxedConsumer<'_, T, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, R> fmt::Debug for BoxedConsumer<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedConsumer").finish_non_exhaustive()
    }
}

impl<'a, T, R> Consumer<T> for BoxedConsumer<'a, T, R> {
    type Output = R;
    type Sink = BoxedSink<'a, T, R>;

    fn create_sink(&self) -> Self::Sink {
        self.inner.create_boxed()
    }
}
