//! Async evaluation over `futures` streams
//!
//! The same holders work over asynchronous sources. A [`StreamSource`] hands out a
//! fresh [`Stream`] of `Result<Item, Error>` per evaluation; the driver polls it one
//! element at a time and applies exactly the same fan-out rules as the blocking
//! path. The stream is dropped before results are assembled.
//!
//! No runtime is required by the library; any executor can drive the futures.
//!
//! ```
//! use futures::executor::block_on;
//! use onepass::reduce::{any, count};
//! use onepass::{stream, SourceExt};
//!
//! let ticks = stream::from_fn(|| futures::stream::iter(1..=5));
//! let (saw_three, n) = block_on(ticks.request(any(|x: &i32| *x == 3)).and(count()).evaluate_async())
//!     .unwrap();
//!
//! assert!(saw_three);
//! assert_eq!(n, 5);
//! ```

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};

use crate::batch::Batch;
use crate::driver;
use crate::error::EvaluationError;
use crate::query::{Query, Requests};
use crate::source::Sequence;

/// A sequence that can be streamed once per evaluation.
pub trait StreamSource: Sequence {
    /// The stream type handed out per traversal.
    type Stream<'a>: Stream<Item = Result<Self::Item, Self::Error>>
    where
        Self: 'a;

    /// Start a fresh traversal.
    fn open(&self) -> Self::Stream<'_>;
}

type Lift<T> = fn(T) -> Result<T, Infallible>;

impl<T: Clone> StreamSource for Vec<T> {
    type Stream<'a>
        = stream::Iter<std::iter::Map<std::iter::Cloned<std::slice::Iter<'a, T>>, Lift<T>>>
    where
        Self: 'a;

    fn open(&self) -> Self::Stream<'_> {
        stream::iter(self.iter().cloned().map(Ok as Lift<T>))
    }
}

impl<S: StreamSource + ?Sized> StreamSource for &S {
    type Stream<'a>
        = S::Stream<'a>
    where
        Self: 'a;

    fn open(&self) -> Self::Stream<'_> {
        (**self).open()
    }
}

impl<S: StreamSource + ?Sized> StreamSource for Arc<S> {
    type Stream<'a>
        = S::Stream<'a>
    where
        Self: 'a;

    fn open(&self) -> Self::Stream<'_> {
        (**self).open()
    }
}

/// Stream source that re-runs a closure for every traversal.
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

/// Build a stream source from a closure returning an infallible stream.
pub fn from_fn<F, St>(f: F) -> FromFn<F>
where
    F: Fn() -> St,
    St: Stream,
{
    FromFn { f }
}

impl<F, St> Sequence for FromFn<F>
where
    F: Fn() -> St,
    St: Stream,
{
    type Item = St::Item;
    type Error = Infallible;
}

impl<F, St> StreamSource for FromFn<F>
where
    F: Fn() -> St,
    St: Stream,
{
    type Stream<'a>
        = stream::Map<St, Lift<St::Item>>
    where
        Self: 'a;

    fn open(&self) -> Self::Stream<'_> {
        (self.f)().map(Ok as Lift<St::Item>)
    }
}

/// Stream source over a stream of `Result`s.
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

/// Build a stream source from a closure returning a stream of `Result`s.
///
/// The first `Err` ends the traversal with
/// [`EvaluationError::Source`](crate::EvaluationError::Source).
pub fn try_from_fn<F, St, T, E>(f: F) -> TryFromFn<F>
where
    F: Fn() -> St,
    St: Stream<Item = Result<T, E>>,
{
    TryFromFn { f }
}

impl<F, St, T, E> Sequence for TryFromFn<F>
where
    F: Fn() -> St,
    St: Stream<Item = Result<T, E>>,
{
    type Item = T;
    type Error = E;
}

impl<F, St, T, E> StreamSource for TryFromFn<F>
where
    F: Fn() -> St,
    St: Stream<Item = Result<T, E>>,
{
    type Stream<'a>
        = St
    where
        Self: 'a;

    fn open(&self) -> St {
        (self.f)()
    }
}

impl<S, C> Query<S, C>
where
    S: StreamSource,
    C: Requests<S::Item>,
{
    /// Stream the source once and return every request's result.
    ///
    /// # Errors
    ///
    /// Same as [`Query::evaluate`], with stream failures reported as
    /// [`EvaluationError::Source`].
    pub async fn evaluate_async(&self) -> Result<C::Output, EvaluationError<S::Error>> {
        let run = driver::evaluate_stream(
            StreamSource::open(self.source()),
            self.requests().create_slots(),
        );

        #[cfg(feature = "tracing")]
        let run = tracing::Instrument::instrument(
            run,
            tracing::debug_span!("evaluate", requests = C::LEN),
        );

        run.await
    }
}

impl<S: StreamSource, R> Batch<'_, S, R> {
    /// Stream the source once and return every request's result.
    ///
    /// # Errors
    ///
    /// Same as [`Query::evaluate_async`].
    pub async fn evaluate_async(&self) -> Result<Vec<R>, EvaluationError<S::Error>> {
        let run = driver::evaluate_stream(StreamSource::open(self.source()), self.create_slots());

        #[cfg(feature = "tracing")]
        let run = tracing::Instrument::instrument(
            run,
            tracing::debug_span!("evaluate", requests = self.len()),
        );

        run.await
    }
}
