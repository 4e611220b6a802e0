//! Element lookups: first, last, single, by index.
//!
//! Each lookup comes in two flavors selected by an [`Absence`] marker: the plain
//! form fails when the element is missing, the `_or_none` form yields `None`.

use std::marker::PhantomData;
use std::sync::Arc;

use super::predicate::{PlainFn, Predicate};
use crate::error::ReduceError;
use crate::sink::{Consumer, Sink};

/// How a lookup reports an element that is not there.
pub trait Absence<T> {
    /// What the lookup produces.
    type Output;

    /// Turn the lookup's outcome into a result, using `missing` if nothing was found.
    fn resolve(found: Option<T>, missing: ReduceError) -> Result<Self::Output, ReduceError>;
}

/// A missing element fails the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

/// A missing element yields `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrNone;

impl<T> Absence<T> for Required {
    type Output = T;

    fn resolve(found: Option<T>, missing: ReduceError) -> Result<T, ReduceError> {
        found.ok_or(missing)
    }
}

impl<T> Absence<T> for OrNone {
    type Output = Option<T>;

    fn resolve(found: Option<T>, _missing: ReduceError) -> Result<Option<T>, ReduceError> {
        Ok(found)
    }
}

/// First element. Created by [`first`] and [`first_or_none`].
#[derive(Debug, Clone, Copy)]
pub struct First<A> {
    absence: PhantomData<fn() -> A>,
}

/// Sink for [`First`]; satisfied by the first element.
#[derive(Debug)]
pub struct FirstSink<T, A> {
    found: Option<T>,
    absence: PhantomData<fn() -> A>,
}

/// First element; fails with [`ReduceError::Empty`] on an empty sequence.
///
/// ```
/// use onepass::reduce::{first, first_or_none};
/// use onepass::SourceExt;
///
/// let (head, maybe) = vec![7, 8].request(first()).and(first_or_none()).evaluate().unwrap();
/// assert_eq!(head, 7);
/// assert_eq!(maybe, Some(7));
/// ```
pub fn first() -> First<Required> {
    First {
        absence: PhantomData,
    }
}

/// First element, or `None` on an empty sequence.
pub fn first_or_none() -> First<OrNone> {
    First {
        absence: PhantomData,
    }
}

impl<T: Clone, A: Absence<T>> Consumer<T> for First<A> {
    type Output = A::Output;
    type Sink = FirstSink<T, A>;

    fn create_sink(&self) -> Self::Sink {
        FirstSink {
            found: None,
            absence: PhantomData,
        }
    }
}

impl<T: Clone, A: Absence<T>> Sink<T> for FirstSink<T, A> {
    type Output = A::Output;

    fn wants_more(&self) -> bool {
        self.found.is_none()
    }

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        self.found = Some(item.clone());
        Ok(())
    }

    fn finish(self) -> Result<A::Output, ReduceError> {
        A::resolve(self.found, ReduceError::Empty)
    }
}

/// First element matching a predicate. Created by [`first_where`].
pub struct FirstWhere<P> {
    predicate: Arc<P>,
}

/// Sink for [`FirstWhere`]; satisfied by the first match.
pub struct FirstWhereSink<P, T> {
    predicate: Arc<P>,
    found: Option<T>,
}

opaque_debug!(FirstWhere<P>);
opaque_debug!(FirstWhereSink<P, T>);

/// First element for which `predicate` holds.
///
/// Fails with [`ReduceError::NoMatch`] if no element matches.
pub fn first_where<T, F>(predicate: F) -> FirstWhere<PlainFn<F>>
where
    F: Fn(&T) -> bool,
{
    FirstWhere {
        predicate: Arc::new(PlainFn(predicate)),
    }
}

impl<T: Clone, P: Predicate<T>> Consumer<T> for FirstWhere<P> {
    type Output = T;
    type Sink = FirstWhereSink<P, T>;

    fn create_sink(&self) -> Self::Sink {
        FirstWhereSink {
            predicate: Arc::clone(&self.predicate),
            found: None,
        }
    }
}

impl<T: Clone, P: Predicate<T>> Sink<T> for FirstWhereSink<P, T> {
    type Output = T;

    fn wants_more(&self) -> bool {
        self.found.is_none()
    }

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        if self.predicate.test(item)? {
            self.found = Some(item.clone());
        }
        Ok(())
    }

    fn finish(self) -> Result<T, ReduceError> {
        self.found.ok_or(ReduceError::NoMatch)
    }
}

/// Last element. Created by [`last`] and [`last_or_none`].
#[derive(Debug, Clone, Copy)]
pub struct Last<A> {
    absence: PhantomData<fn() -> A>,
}

/// Sink for [`Last`]; needs the whole sequence.
#[derive(Debug)]
pub struct LastSink<T, A> {
    found: Option<T>,
    absence: PhantomData<fn() -> A>,
}

/// Last element; fails with [`ReduceError::Empty`] on an empty sequence.
pub fn last() -> Last<Required> {
    Last {
        absence: PhantomData,
    }
}

/// Last element, or `None` on an empty sequence.
pub fn last_or_none() -> Last<OrNone> {
    Last {
        absence: PhantomData,
    }
}

impl<T: Clone, A: Absence<T>> Consumer<T> for Last<A> {
    type Output = A::Output;
    type Sink = LastSink<T, A>;

    fn create_sink(&self) -> Self::Sink {
        LastSink {
            found: None,
            absence: PhantomData,
        }
    }
}

impl<T: Clone, A: Absence<T>> Sink<T> for LastSink<T, A> {
    type Output = A::Output;

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        self.found = Some(item.clone());
        Ok(())
    }

    fn finish(self) -> Result<A::Output, ReduceError> {
        A::resolve(self.found, ReduceError::Empty)
    }
}

/// The only element. Created by [`single`] and [`single_or_none`].
#[derive(Debug, Clone, Copy)]
pub struct Single<A> {
    absence: PhantomData<fn() -> A>,
}

/// Sink for [`Single`]; satisfied once a second element shows up.
#[derive(Debug)]
pub struct SingleSink<T, A> {
    found: Option<T>,
    seen: usize,
    absence: PhantomData<fn() -> A>,
}

/// The sequence's only element.
///
/// Fails with [`ReduceError::Empty`] on an empty sequence and with
/// [`ReduceError::MoreThanOne`] if a second element exists. Stops wanting input
/// after the second element.
pub fn single() -> Single<Required> {
    Single {
        absence: PhantomData,
    }
}

/// The only element, or `None` on an empty sequence.
///
/// Still fails with [`ReduceError::MoreThanOne`] if a second element exists.
pub fn single_or_none() -> Single<OrNone> {
    Single {
        absence: PhantomData,
    }
}

impl<T: Clone, A: Absence<T>> Consumer<T> for Single<A> {
    type Output = A::Output;
    type Sink = SingleSink<T, A>;

    fn create_sink(&self) -> Self::Sink {
        SingleSink {
            found: None,
            seen: 0,
            absence: PhantomData,
        }
    }
}

impl<T: Clone, A: Absence<T>> Sink<T> for SingleSink<T, A> {
    type Output = A::Output;

    fn wants_more(&self) -> bool {
        self.seen < 2
    }

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        if self.seen == 0 {
            self.found = Some(item.clone());
        }
        self.seen += 1;
        Ok(())
    }

    fn finish(self) -> Result<A::Output, ReduceError> {
        if self.seen > 1 {
            return Err(ReduceError::MoreThanOne);
        }
        A::resolve(self.found, ReduceError::Empty)
    }
}

/// Element at a zero-based index.
///
/// Created by [`element_at`] and [`element_at_or_none`].
#[derive(Debug, Clone, Copy)]
pub struct ElementAt<A> {
    index: usize,
    absence: PhantomData<fn() -> A>,
}

/// Sink for [`ElementAt`]; satisfied once the index is reached.
#[derive(Debug)]
pub struct ElementAtSink<T, A> {
    index: usize,
    seen: usize,
    found: Option<T>,
    absence: PhantomData<fn() -> A>,
}

/// Element at zero-based `index`.
///
/// Fails with [`ReduceError::OutOfRange`] if the sequence is too short.
pub fn element_at(index: usize) -> ElementAt<Required> {
    ElementAt {
        index,
        absence: PhantomData,
    }
}

/// Element at zero-based `index`, or `None` if the sequence is too short.
pub fn element_at_or_none(index: usize) -> ElementAt<OrNone> {
    ElementAt {
        index,
        absence: PhantomData,
    }
}

impl<T: Clone, A: Absence<T>> Consumer<T> for ElementAt<A> {
    type Output = A::Output;
    type Sink = ElementAtSink<T, A>;

    fn create_sink(&self) -> Self::Sink {
        ElementAtSink {
            index: self.index,
            seen: 0,
            found: None,
            absence: PhantomData,
        }
    }
}

impl<T: Clone, A: Absence<T>> Sink<T> for ElementAtSink<T, A> {
    type Output = A::Output;

    fn wants_more(&self) -> bool {
        self.found.is_none()
    }

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        if self.seen == self.index {
            self.found = Some(item.clone());
        }
        self.seen += 1;
        Ok(())
    }

    fn finish(self) -> Result<A::Output, ReduceError> {
        let missing = ReduceError::OutOfRange {
            index: self.index,
            len: self.seen,
        };
        A::resolve(self.found, missing)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::source::from_fn;
    use crate::SourceExt;

    #[test]
    fn test_first_and_last() {
        let (head, tail) = vec![1, 2, 3]
            .request(first())
            .and(last())
            .evaluate()
            .unwrap();
        assert_eq!((head, tail), (1, 3));
    }

    #[test]
    fn test_missing_elements() {
        let empty = Vec::<i32>::new();

        let err = (&empty).request(first()).evaluate().unwrap_err();
        assert!(matches!(err.into_failure().cause(), ReduceError::Empty));

        let (a, b, c) = (&empty)
            .request(first_or_none())
            .and(last_or_none())
            .and(single_or_none())
            .evaluate()
            .unwrap();
        assert_eq!((a, b, c), (None, None, None));
    }

    #[test]
    fn test_first_where() {
        let (even,) = vec![1, 3, 4, 6]
            .request(first_where(|x: &i32| x % 2 == 0))
            .evaluate()
            .unwrap();
        assert_eq!(even, 4);

        let err = vec![1, 3]
            .request(first_where(|x: &i32| x % 2 == 0))
            .evaluate()
            .unwrap_err();
        assert!(matches!(err.into_failure().cause(), ReduceError::NoMatch));
    }

    #[test]
    fn test_single_stops_after_second_element() {
        let pulled = Cell::new(0);
        let pulled = &pulled;
        let source = from_fn(move || (1..=10).inspect(move |_| pulled.set(pulled.get() + 1)));

        let err = (&source).request(single()).evaluate().unwrap_err();

        assert!(matches!(err.into_failure().cause(), ReduceError::MoreThanOne));
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn test_single_or_none_still_rejects_many() {
        let err = vec![1, 2].request(single_or_none()).evaluate().unwrap_err();
        assert!(matches!(err.into_failure().cause(), ReduceError::MoreThanOne));

        let (only,) = vec![9].request(single_or_none()).evaluate().unwrap();
        assert_eq!(only, Some(9));
    }

    #[test]
    fn test_element_at() {
        let letters = vec!['a', 'b', 'c'];

        let (b, missing) = (&letters)
            .request(element_at(1))
            .and(element_at_or_none(7))
            .evaluate()
            .unwrap();
        assert_eq!(b, 'b');
        assert_eq!(missing, None);

        let err = (&letters).request(element_at(5)).evaluate().unwrap_err();
        match err.into_failure().into_cause() {
            ReduceError::OutOfRange { index, len } => assert_eq!((index, len), (5, 3)),
            other => panic!("unexpected cause: {other}"),
        }
    }
}
