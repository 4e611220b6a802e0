//! Source sequences and traversal cursors
//!
//! A [`Source`] is anything that can hand out a fresh forward-only [`Cursor`] each
//! time it is evaluated. The cursor is owned by the driver for exactly one traversal
//! and released by `Drop` on every exit path: exhaustion, short-circuit, or failure.
//!
//! Sources are not required to be replayable in any deeper sense: each evaluation
//! simply calls [`Source::open`] again. Whether re-running the underlying producer
//! is acceptable is the caller's business.
//!
//! # Adapters
//!
//! - `Vec<T>` yields clones of its elements.
//! - [`from_fn`] re-invokes a closure producing any `IntoIterator` per evaluation.
//! - [`try_from_fn`] does the same for fallible producers, surfacing failures as
//!   [`EvaluationError::Source`](crate::EvaluationError::Source).
//!
//! ```
//! use onepass::reduce::{count, sum};
//! use onepass::source;
//! use onepass::SourceExt;
//!
//! let numbers = source::from_fn(|| 1..=4);
//! let (n, total) = numbers.request(count()).and(sum()).evaluate().unwrap();
//! assert_eq!((n, total), (4, 10));
//! ```

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

/// A forward-only, single-pass traversal over a source.
pub trait Cursor {
    /// Elements produced by the cursor.
    type Item;
    /// Failure raised while advancing.
    type Error;

    /// Advance to the next element, or `Ok(None)` once exhausted.
    fn try_next(&mut self) -> Result<Option<Self::Item>, Self::Error>;
}

/// The element and failure types of a sequence.
///
/// Shared by blocking [`Source`]s and async
/// [`StreamSource`](crate::stream::StreamSource)s so that requests can be typed
/// before the sequence is traversed.
pub trait Sequence {
    /// Elements of the sequence.
    type Item;
    /// Failure raised while opening or advancing the sequence.
    type Error;
}

/// A sequence that can be traversed once per evaluation.
pub trait Source: Sequence {
    /// The cursor type handed out per traversal.
    type Cursor<'a>: Cursor<Item = Self::Item, Error = Self::Error>
    where
        Self: 'a;

    /// Start a fresh traversal.
    fn open(&self) -> Result<Self::Cursor<'_>, Self::Error>;
}

/// Cursor over an infallible iterator.
#[derive(Debug, Clone)]
pub struct IterCursor<I> {
    iter: I,
}

impl<I> IterCursor<I> {
    /// Wrap an iterator.
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I: Iterator> Cursor for IterCursor<I> {
    type Item = I::Item;
    type Error = Infallible;

    fn try_next(&mut self) -> Result<Option<I::Item>, Infallible> {
        Ok(self.iter.next())
    }
}

/// Cursor over an iterator of `Result`s.
#[derive(Debug, Clone)]
pub struct TryIterCursor<I> {
    iter: I,
}

impl<I> TryIterCursor<I> {
    /// Wrap a fallible iterator.
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I, T, E> Cursor for TryIterCursor<I>
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = T;
    type Error = E;

    fn try_next(&mut self) -> Result<Option<T>, E> {
        self.iter.next().transpose()
    }
}

impl<T> Sequence for Vec<T> {
    type Item = T;
    type Error = Infallible;
}

impl<T: Clone> Source for Vec<T> {
    type Cursor<'a>
        = IterCursor<std::iter::Cloned<std::slice::Iter<'a, T>>>
    where
        Self: 'a;

    fn open(&self) -> Result<Self::Cursor<'_>, Infallible> {
        Ok(IterCursor::new(self.iter().cloned()))
    }
}

impl<S: Sequence + ?Sized> Sequence for &S {
    type Item = S::Item;
    type Error = S::Error;
}

impl<S: Source + ?Sized> Source for &S {
    type Cursor<'a>
        = S::Cursor<'a>
    where
        Self: 'a;

    fn open(&self) -> Result<Self::Cursor<'_>, S::Error> {
        (**self).open()
    }
}

impl<S: Sequence + ?Sized> Sequence for Arc<S> {
    type Item = S::Item;
    type Error = S::Error;
}

impl<S: Source + ?Sized> Source for Arc<S> {
    type Cursor<'a>
        = S::Cursor<'a>
    where
        Self: 'a;

    fn open(&self) -> Result<Self::Cursor<'_>, S::Error> {
        (**self).open()
    }
}

/// Source that re-runs a closure for every traversal.
///
/// Created by [`from_fn`].
#[derive(Clone)]
pub struct FromFn<F> {
    f: F,
}

impl<F> fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromFn").field("f", &"<closure>").finish()
    }
}

/// Build a source from a closure returning any iterable.
///
/// The closure runs once per evaluation, so side effects in it happen once per
/// evaluation.
///
/// ```
/// use std::cell::Cell;
/// use onepass::reduce::{count, to_vec};
/// use onepass::{source, SourceExt};
///
/// let opened = Cell::new(0);
/// let src = source::from_fn(|| {
///     opened.set(opened.get() + 1);
///     vec!["a", "b"]
/// });
///
/// let (n, items) = (&src).request(count()).and(to_vec()).evaluate().unwrap();
/// assert_eq!(n, 2);
/// assert_eq!(items, vec!["a", "b"]);
/// assert_eq!(opened.get(), 1);
/// ```
pub fn from_fn<F, I>(f: F) -> FromFn<F>
where
    F: Fn() -> I,
    I: IntoIterator,
{
    FromFn { f }
}

impl<F, I> Sequence for FromFn<F>
where
    F: Fn() -> I,
    I: IntoIterator,
{
    type Item = I::Item;
    type Error = Infallible;
}

impl<F, I> Source for FromFn<F>
where
    F: Fn() -> I,
    I: IntoIterator,
{
    type Cursor<'a>
        = IterCursor<I::IntoIter>
    where
        Self: 'a;

    fn open(&self) -> Result<Self::Cursor<'_>, Infallible> {
        Ok(IterCursor::new((self.f)().into_iter()))
    }
}

/// Source that re-runs a fallible closure for every traversal.
///
/// Created by [`try_from_fn`].
#[derive(Clone)]
pub struct TryFromFn<F> {
    f: F,
}

impl<F> fmt::Debug for TryFromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryFromFn").field("f", &"<closure>").finish()
    }
}

/// Build a source from a closure that may fail to open and whose elements may fail.
///
/// ```
/// use onepass::reduce::count;
/// use onepass::{source, EvaluationError, SourceExt};
///
/// let rows = source::try_from_fn(|| {
///     Ok::<_, String>(vec![Ok(1), Ok(2), Err("connection reset".to_string())])
/// });
///
/// let err = rows.request(count()).evaluate().unwrap_err();
/// assert!(matches!(err, EvaluationError::Source(ref msg) if msg == "connection reset"));
/// ```
pub fn try_from_fn<F, I, T, E>(f: F) -> TryFromFn<F>
where
    F: Fn() -> Result<I, E>,
    I: IntoIterator<Item = Result<T, E>>,
{
    TryFromFn { f }
}

impl<F, I, T, E> Sequence for TryFromFn<F>
where
    F: Fn() -> Result<I, E>,
    I: IntoIterator<Item = Result<T, E>>,
{
    type Item = T;
    type Error = E;
}

impl<F, I, T, E> Source for TryFromFn<F>
where
    F: Fn() -> Result<I, E>,
    I: IntoIterator<Item = Result<T, E>>,
{
    type Cursor<'a>
        = TryIterCursor<I::IntoIter>
    where
        Self: 'a;

    fn open(&self) -> Result<Self::Cursor<'_>, E> {
        Ok(TryIterCursor::new((self.f)()?.into_iter()))
    }
}
