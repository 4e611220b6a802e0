//! Quantifiers: any, all, contains, non-empty.

use std::sync::Arc;

use super::callback;
use crate::error::{BoxError, ReduceError};
use crate::sink::{Consumer, Sink};

/// A test applied to each element, which may fail.
///
/// Implemented by [`PlainFn`] for `Fn(&T) -> bool` and by [`TryFn`] for
/// `Fn(&T) -> Result<bool, E>`.
pub trait Predicate<T> {
    /// Test one element.
    fn test(&self, item: &T) -> Result<bool, ReduceError>;
}

/// An infallible caller-supplied function.
#[derive(Clone, Copy)]
pub struct PlainFn<F>(pub F);

/// A fallible caller-supplied function; its errors become [`ReduceError::Callback`].
#[derive(Clone, Copy)]
pub struct TryFn<F>(pub F);

opaque_debug!(PlainFn<F>);
opaque_debug!(TryFn<F>);

impl<T, F> Predicate<T> for PlainFn<F>
where
    F: Fn(&T) -> bool,
{
    fn test(&self, item: &T) -> Result<bool, ReduceError> {
        Ok((self.0)(item))
    }
}

impl<T, E, F> Predicate<T> for TryFn<F>
where
    F: Fn(&T) -> Result<bool, E>,
    E: Into<BoxError>,
{
    fn test(&self, item: &T) -> Result<bool, ReduceError> {
        callback((self.0)(item))
    }
}

/// Whether any element satisfies a predicate. Created by [`any`] and [`try_any`].
pub struct Any<P> {
    predicate: Arc<P>,
}

/// Sink for [`Any`]; stops at the first match.
pub struct AnySink<P> {
    predicate: Arc<P>,
    found: bool,
}

opaque_debug!(Any<P>);
opaque_debug!(AnySink<P>);

/// `true` if any element satisfies `predicate`.
///
/// Stops wanting input at the first match.
///
/// ```
/// use onepass::reduce::any;
/// use onepass::SourceExt;
///
/// let (found,) = vec![1, 2, 3].request(any(|x: &i32| *x > 2)).evaluate().unwrap();
/// assert!(found);
/// ```
pub fn any<T, F>(predicate: F) -> Any<PlainFn<F>>
where
    F: Fn(&T) -> bool,
{
    Any {
        predicate: Arc::new(PlainFn(predicate)),
    }
}

/// Like [`any`], with a predicate that may fail.
pub fn try_any<T, E, F>(predicate: F) -> Any<TryFn<F>>
where
    F: Fn(&T) -> Result<bool, E>,
    E: Into<BoxError>,
{
    Any {
        predicate: Arc::new(TryFn(predicate)),
    }
}

impl<T, P: Predicate<T>> Consumer<T> for Any<P> {
    type Output = bool;
    type Sink = AnySink<P>;

    fn create_sink(&self) -> AnySink<P> {
        AnySink {
            predicate: Arc::clone(&self.predicate),
            found: false,
        }
    }
}

impl<T, P: Predicate<T>> Sink<T> for AnySink<P> {
    type Output = bool;

    fn wants_more(&self) -> bool {
        !self.found
    }

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        self.found = self.predicate.test(item)?;
        Ok(())
    }

    fn finish(self) -> Result<bool, ReduceError> {
        Ok(self.found)
    }
}

/// Whether every element satisfies a predicate. Created by [`all`] and [`try_all`].
pub struct All<P> {
    predicate: Arc<P>,
}

/// Sink for [`All`]; stops at the first counterexample.
pub struct AllSink<P> {
    predicate: Arc<P>,
    holds: bool,
}

opaque_debug!(All<P>);
opaque_debug!(AllSink<P>);

/// `true` if every element satisfies `predicate` (vacuously true when empty).
///
/// Stops wanting input at the first element that fails the predicate.
pub fn all<T, F>(predicate: F) -> All<PlainFn<F>>
where
    F: Fn(&T) -> bool,
{
    All {
        predicate: Arc::new(PlainFn(predicate)),
    }
}

/// Like [`all`], with a predicate that may fail.
pub fn try_all<T, E, F>(predicate: F) -> All<TryFn<F>>
where
    F: Fn(&T) -> Result<bool, E>,
    E: Into<BoxError>,
{
    All {
        predicate: Arc::new(TryFn(predicate)),
    }
}

impl<T, P: Predicate<T>> Consumer<T> for All<P> {
    type Output = bool;
    type Sink = AllSink<P>;

    fn create_sink(&self) -> AllSink<P> {
        AllSink {
            predicate: Arc::clone(&self.predicate),
            holds: true,
        }
    }
}

impl<T, P: Predicate<T>> Sink<T> for AllSink<P> {
    type Output = bool;

    fn wants_more(&self) -> bool {
        self.holds
    }

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        self.holds = self.predicate.test(item)?;
        Ok(())
    }

    fn finish(self) -> Result<bool, ReduceError> {
        Ok(self.holds)
    }
}

/// Whether the sequence has any element at all. Created by [`non_empty`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmpty;

/// Sink for [`NonEmpty`]; satisfied by the first element.
#[derive(Debug, Default)]
pub struct NonEmptySink {
    seen: bool,
}

/// `true` if the sequence yields at least one element.
pub fn non_empty() -> NonEmpty {
    NonEmpty
}

impl<T> Consumer<T> for NonEmpty {
    type Output = bool;
    type Sink = NonEmptySink;

    fn create_sink(&self) -> NonEmptySink {
        NonEmptySink::default()
    }
}

impl<T> Sink<T> for NonEmptySink {
    type Output = bool;

    fn wants_more(&self) -> bool {
        !self.seen
    }

    fn accept(&mut self, _item: &T) -> Result<(), ReduceError> {
        self.seen = true;
        Ok(())
    }

    fn finish(self) -> Result<bool, ReduceError> {
        Ok(self.seen)
    }
}

/// Whether the sequence contains a value. Created by [`contains`].
#[derive(Debug)]
pub struct Contains<T> {
    value: Arc<T>,
}

/// Sink for [`Contains`].
#[derive(Debug)]
pub struct ContainsSink<T> {
    value: Arc<T>,
    found: bool,
}

/// `true` if some element equals `value`.
pub fn contains<T: PartialEq>(value: T) -> Contains<T> {
    Contains {
        value: Arc::new(value),
    }
}

impl<T: PartialEq> Consumer<T> for Contains<T> {
    type Output = bool;
    type Sink = ContainsSink<T>;

    fn create_sink(&self) -> ContainsSink<T> {
        ContainsSink {
            value: Arc::clone(&self.value),
            found: false,
        }
    }
}

impl<T: PartialEq> Sink<T> for ContainsSink<T> {
    type Output = bool;

    fn wants_more(&self) -> bool {
        !self.found
    }

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        self.found = *item == *self.value;
        Ok(())
    }

    fn finish(self) -> Result<bool, ReduceError> {
        Ok(self.found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceExt;

    #[test]
    fn test_any_stops_wanting_after_match() {
        let mut sink = Consumer::<i32>::create_sink(&any(|x: &i32| *x == 2));

        sink.accept(&1).unwrap();
        assert!(Sink::<i32>::wants_more(&sink));
        sink.accept(&2).unwrap();
        assert!(!Sink::<i32>::wants_more(&sink));
        assert!(Sink::<i32>::finish(sink).unwrap());
    }

    #[test]
    fn test_any_on_empty_is_false() {
        let (found,) = Vec::<i32>::new()
            .request(any(|_: &i32| true))
            .evaluate()
            .unwrap();
        assert!(!found);
    }

    #[test]
    fn test_all_vacuous_and_counterexample() {
        let (empty, mixed) = (
            Vec::<i32>::new().request(all(|x: &i32| *x > 0)).evaluate().unwrap().0,
            vec![1, -1, 2].request(all(|x: &i32| *x > 0)).evaluate().unwrap().0,
        );
        assert!(empty);
        assert!(!mixed);
    }

    #[test]
    fn test_try_any_wraps_error() {
        let err = vec![1, 2]
            .request(try_any(|x: &i32| {
                if *x == 2 {
                    Err("boom")
                } else {
                    Ok(false)
                }
            }))
            .evaluate()
            .unwrap_err();

        assert_eq!(err.position(), Some(1));
        assert!(err.into_failure().cause().is_callback());
    }

    #[test]
    fn test_try_all_passes_through() {
        let (ok,) = vec![2, 4]
            .request(try_all(|x: &i32| Ok::<_, String>(x % 2 == 0)))
            .evaluate()
            .unwrap();
        assert!(ok);
    }

    #[test]
    fn test_non_empty_and_contains() {
        let (has_any, has_three, has_nine) = vec![1, 2, 3]
            .request(non_empty())
            .and(contains(3))
            .and(contains(9))
            .evaluate()
            .unwrap();

        assert!(has_any);
        assert!(has_three);
        assert!(!has_nine);
    }
}
