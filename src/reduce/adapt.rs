//! Consumer combinators.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::ReduceError;
use crate::sink::{Consumer, Sink};

/// Combinators available on every [`Consumer`].
///
/// ```
/// use onepass::reduce::{count, sum, to_vec, ConsumerExt};
/// use onepass::SourceExt;
///
/// let words = vec!["pear", "fig", "banana", "kiwi"];
///
/// let (letters, short, head, label) = words
///     .request(sum().select(|w: &&str| w.len()))
///     .and(count().filter(|w: &&str| w.len() <= 4))
///     .and(to_vec().take(2))
///     .and(count().map(|n| format!("{n} words")))
///     .evaluate()
///     .unwrap();
///
/// assert_eq!(letters, 17);
/// assert_eq!(short, 3);
/// assert_eq!(head, vec!["pear", "fig"]);
/// assert_eq!(label, "4 words");
/// ```
pub trait ConsumerExt<T>: Consumer<T> + Sized {
    /// Transform the result once the reduction has finished.
    fn map<R, F>(self, f: F) -> Map<Self, F, T>
    where
        F: Fn(Self::Output) -> R,
    {
        Map {
            inner: self,
            f: Arc::new(f),
            input: PhantomData,
        }
    }

    /// Reduce a projection of each element instead of the element itself.
    ///
    /// The returned consumer accepts `S`, projecting each element to `T` with `f`.
    fn select<S, F>(self, f: F) -> Select<Self, F, T>
    where
        F: Fn(&S) -> T,
    {
        Select {
            inner: self,
            f: Arc::new(f),
            input: PhantomData,
        }
    }

    /// Reduce only the elements for which `predicate` holds.
    fn filter<F>(self, predicate: F) -> Filter<Self, F, T>
    where
        F: Fn(&T) -> bool,
    {
        Filter {
            inner: self,
            predicate: Arc::new(predicate),
            input: PhantomData,
        }
    }

    /// Reduce only the first `n` elements, then stop wanting input.
    fn take(self, n: usize) -> Take<Self, T> {
        Take {
            inner: self,
            n,
            input: PhantomData,
        }
    }
}

impl<T, C: Consumer<T>> ConsumerExt<T> for C {}

/// Result transformation. Created by [`ConsumerExt::map`].
pub struct Map<C, F, T> {
    inner: C,
    f: Arc<F>,
    input: PhantomData<fn(&T)>,
}

/// Sink for [`Map`].
pub struct MapSink<S, F> {
    inner: S,
    f: Arc<F>,
}

opaque_debug!(Map<C, F, T>);
opaque_debug!(MapSink<S, F>);

impl<T, R, C, F> Consumer<T> for Map<C, F, T>
where
    C: Consumer<T>,
    F: Fn(C::Output) -> R,
{
    type Output = R;
    type Sink = MapSink<C::Sink, F>;

    fn create_sink(&self) -> Self::Sink {
        MapSink {
            inner: self.inner.create_sink(),
            f: Arc::clone(&self.f),
        }
    }
}

impl<T, R, S, F> Sink<T> for MapSink<S, F>
where
    S: Sink<T>,
    F: Fn(S::Output) -> R,
{
    type Output = R;

    fn wants_more(&self) -> bool {
        self.inner.wants_more()
    }

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        self.inner.accept(item)
    }

    fn finish(self) -> Result<R, ReduceError> {
        let f = self.f;
        self.inner.finish().map(|output| f(output))
    }
}

/// Element projection. Created by [`ConsumerExt::select`].
pub struct Select<C, F, T> {
    inner: C,
    f: Arc<F>,
    input: PhantomData<fn(&T)>,
}

/// Sink for [`Select`].
pub struct SelectSink<S, F> {
    inner: S,
    f: Arc<F>,
}

opaque_debug!(Select<C, F, T>);
opaque_debug!(SelectSink<S, F>);

impl<S, T, C, F> Consumer<S> for Select<C, F, T>
where
    C: Consumer<T>,
    F: Fn(&S) -> T,
{
    type Output = C::Output;
    type Sink = SelectSink<C::Sink, F>;

    fn create_sink(&self) -> Self::Sink {
        SelectSink {
            inner: self.inner.create_sink(),
            f: Arc::clone(&self.f),
        }
    }
}

impl<S, T, K, F> Sink<S> for SelectSink<K, F>
where
    K: Sink<T>,
    F: Fn(&S) -> T,
{
    type Output = K::Output;

    fn wants_more(&self) -> bool {
        self.inner.wants_more()
    }

    fn accept(&mut self, item: &S) -> Result<(), ReduceError> {
        let projected = (self.f)(item);
        self.inner.accept(&projected)
    }

    fn finish(self) -> Result<K::Output, ReduceError> {
        self.inner.finish()
    }
}

/// Element filter. Created by [`ConsumerExt::filter`].
pub struct Filter<C, F, T> {
    inner: C,
    predicate: Arc<F>,
    input: PhantomData<fn(&T)>,
}

/// Sink for [`Filter`].
pub struct FilterSink<S, F> {
    inner: S,
    predicate: Arc<F>,
}

opaque_debug!(Filter<C, F, T>);
opaque_debug!(FilterSink<S, F>);

impl<T, C, F> Consumer<T> for Filter<C, F, T>
where
    C: Consumer<T>,
    F: Fn(&T) -> bool,
{
    type Output = C::Output;
    type Sink = FilterSink<C::Sink, F>;

    fn create_sink(&self) -> Self::Sink {
        FilterSink {
            inner: self.inner.create_sink(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T, S, F> Sink<T> for FilterSink<S, F>
where
    S: Sink<T>,
    F: Fn(&T) -> bool,
{
    type Output = S::Output;

    fn wants_more(&self) -> bool {
        self.inner.wants_more()
    }

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        if (self.predicate)(item) {
            self.inner.accept(item)
        } else {
            Ok(())
        }
    }

    fn finish(self) -> Result<S::Output, ReduceError> {
        self.inner.finish()
    }
}

/// Prefix limit. Created by [`ConsumerExt::take`].
pub struct Take<C, T> {
    inner: C,
    n: usize,
    input: PhantomData<fn(&T)>,
}

/// Sink for [`Take`].
#[derive(Debug)]
pub struct TakeSink<S> {
    inner: S,
    remaining: usize,
}

impl<C: fmt::Debug, T> fmt::Debug for Take<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Take")
            .field("inner", &self.inner)
            .field("n", &self.n)
            .finish()
    }
}

impl<T, C: Consumer<T>> Consumer<T> for Take<C, T> {
    type Output = C::Output;
    type Sink = TakeSink<C::Sink>;

    fn create_sink(&self) -> Self::Sink {
        TakeSink {
            inner: self.inner.create_sink(),
            remaining: self.n,
        }
    }
}

impl<T, S: Sink<T>> Sink<T> for TakeSink<S> {
    type Output = S::Output;

    fn wants_more(&self) -> bool {
        self.remaining > 0 && self.inner.wants_more()
    }

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        self.remaining -= 1;
        self.inner.accept(item)
    }

    fn finish(self) -> Result<S::Output, ReduceError> {
        self.inner.finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::reduce::{any, count, first_or_none, to_vec};
    use crate::source::from_fn;
    use crate::SourceExt;

    #[test]
    fn test_take_lets_traversal_stop() {
        let pulled = Cell::new(0);
        let pulled = &pulled;
        let source = from_fn(move || (1..=100).inspect(move |_| pulled.set(pulled.get() + 1)));

        let (head, n) = (&source)
            .request(to_vec().take(3))
            .and(count().take(5))
            .evaluate()
            .unwrap();

        assert_eq!(head, vec![1, 2, 3]);
        assert_eq!(n, 5);
        assert_eq!(pulled.get(), 5);
    }

    #[test]
    fn test_take_zero_pulls_nothing() {
        let pulled = Cell::new(0);
        let pulled = &pulled;
        let source = from_fn(move || (1..=3).inspect(move |_| pulled.set(pulled.get() + 1)));

        let (items,) = (&source).request(to_vec().take(0)).evaluate().unwrap();

        assert!(items.is_empty());
        assert_eq!(pulled.get(), 0);
    }

    #[test]
    fn test_filter_keeps_inner_short_circuit() {
        let (first_big, big_count) = vec![1, 50, 2, 70]
            .request(first_or_none().filter(|x: &i32| *x > 10))
            .and(count().filter(|x: &i32| *x > 10))
            .evaluate()
            .unwrap();

        assert_eq!(first_big, Some(50));
        assert_eq!(big_count, 2);
    }

    #[test]
    fn test_select_projects_before_reducing() {
        let pairs = vec![("a", 1), ("b", 2)];
        let (has_two, keys) = pairs
            .request(any(|n: &i32| *n == 2).select(|p: &(&str, i32)| p.1))
            .and(to_vec().select(|p: &(&str, i32)| p.0.to_string()))
            .evaluate()
            .unwrap();

        assert!(has_two);
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_map_runs_only_on_success() {
        let mapped = Cell::new(false);
        let err = Vec::<i32>::new()
            .request(crate::reduce::first().map(|x: i32| {
                mapped.set(true);
                x
            }))
            .evaluate()
            .unwrap_err();

        assert_eq!(err.position(), Some(1));
        assert!(!mapped.get());
    }
}
