//! General-purpose folds.

use std::sync::Arc;

use super::callback;
use crate::error::{BoxError, ReduceError};
use crate::sink::{Consumer, Sink};

/// Fold with a seed. Created by [`fold`].
pub struct Fold<A, F> {
    seed: A,
    f: Arc<F>,
}

/// Sink for [`Fold`].
pub struct FoldSink<A, F> {
    acc: Option<A>,
    f: Arc<F>,
}

opaque_debug!(Fold<A, F>);
opaque_debug!(FoldSink<A, F>);

/// Fold every element into an accumulator starting from `seed`.
///
/// The seed is cloned once per evaluation.
///
/// ```
/// use onepass::reduce::fold;
/// use onepass::SourceExt;
///
/// let (csv,) = vec!["a", "b", "c"]
///     .request(fold(String::new(), |mut acc: String, s: &&str| {
///         if !acc.is_empty() {
///             acc.push(',');
///         }
///         acc.push_str(s);
///         acc
///     }))
///     .evaluate()
///     .unwrap();
///
/// assert_eq!(csv, "a,b,c");
/// ```
pub fn fold<T, A, F>(seed: A, f: F) -> Fold<A, F>
where
    A: Clone,
    F: Fn(A, &T) -> A,
{
    Fold {
        seed,
        f: Arc::new(f),
    }
}

impl<T, A, F> Consumer<T> for Fold<A, F>
where
    A: Clone,
    F: Fn(A, &T) -> A,
{
    type Output = A;
    type Sink = FoldSink<A, F>;

    fn create_sink(&self) -> Self::Sink {
        FoldSink {
            acc: Some(self.seed.clone()),
            f: Arc::clone(&self.f),
        }
    }
}

impl<T, A, F> Sink<T> for FoldSink<A, F>
where
    F: Fn(A, &T) -> A,
{
    type Output = A;

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        self.acc = self.acc.take().map(|acc| (self.f)(acc, item));
        Ok(())
    }

    fn finish(self) -> Result<A, ReduceError> {
        self.acc.ok_or(ReduceError::Empty)
    }
}

/// Fold with a seed and a fallible step. Created by [`try_fold`].
pub struct TryFold<A, F> {
    seed: A,
    f: Arc<F>,
}

/// Sink for [`TryFold`].
pub struct TryFoldSink<A, F> {
    acc: Option<A>,
    f: Arc<F>,
}

opaque_debug!(TryFold<A, F>);
opaque_debug!(TryFoldSink<A, F>);

/// Like [`fold`], with a step that may fail.
pub fn try_fold<T, A, E, F>(seed: A, f: F) -> TryFold<A, F>
where
    A: Clone,
    F: Fn(A, &T) -> Result<A, E>,
    E: Into<BoxError>,
{
    TryFold {
        seed,
        f: Arc::new(f),
    }
}

impl<T, A, E, F> Consumer<T> for TryFold<A, F>
where
    A: Clone,
    F: Fn(A, &T) -> Result<A, E>,
    E: Into<BoxError>,
{
    type Output = A;
    type Sink = TryFoldSink<A, F>;

    fn create_sink(&self) -> Self::Sink {
        TryFoldSink {
            acc: Some(self.seed.clone()),
            f: Arc::clone(&self.f),
        }
    }
}

impl<T, A, E, F> Sink<T> for TryFoldSink<A, F>
where
    F: Fn(A, &T) -> Result<A, E>,
    E: Into<BoxError>,
{
    type Output = A;

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        if let Some(acc) = self.acc.take() {
            self.acc = Some(callback((self.f)(acc, item))?);
        }
        Ok(())
    }

    fn finish(self) -> Result<A, ReduceError> {
        self.acc.ok_or(ReduceError::Empty)
    }
}

/// Fold without a seed. Created by [`reduce`].
pub struct Reduce<F> {
    f: Arc<F>,
}

/// Sink for [`Reduce`].
pub struct ReduceSink<F, T> {
    acc: Option<T>,
    f: Arc<F>,
}

opaque_debug!(Reduce<F>);
opaque_debug!(ReduceSink<F, T>);

/// Combine elements pairwise, starting from the first one.
///
/// Fails with [`ReduceError::Empty`] on an empty sequence.
pub fn reduce<T, F>(f: F) -> Reduce<F>
where
    T: Clone,
    F: Fn(T, &T) -> T,
{
    Reduce { f: Arc::new(f) }
}

impl<T, F> Consumer<T> for Reduce<F>
where
    T: Clone,
    F: Fn(T, &T) -> T,
{
    type Output = T;
    type Sink = ReduceSink<F, T>;

    fn create_sink(&self) -> Self::Sink {
        ReduceSink {
            acc: None,
            f: Arc::clone(&self.f),
        }
    }
}

impl<T, F> Sink<T> for ReduceSink<F, T>
where
    T: Clone,
    F: Fn(T, &T) -> T,
{
    type Output = T;

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        self.acc = Some(match self.acc.take() {
            Some(acc) => (self.f)(acc, item),
            None => item.clone(),
        });
        Ok(())
    }

    fn finish(self) -> Result<T, ReduceError> {
        self.acc.ok_or(ReduceError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceExt;

    #[test]
    fn test_fold_on_empty_returns_seed() {
        let (total,) = Vec::<i32>::new()
            .request(fold(10, |acc: i32, x: &i32| acc + x))
            .evaluate()
            .unwrap();
        assert_eq!(total, 10);
    }

    #[test]
    fn test_fold_reuses_seed_across_evaluations() {
        let q = vec![1, 2, 3].request(fold(Vec::new(), |mut acc: Vec<i32>, x: &i32| {
            acc.push(x * 10);
            acc
        }));

        assert_eq!(q.evaluate().unwrap().0, vec![10, 20, 30]);
        assert_eq!(q.evaluate().unwrap().0, vec![10, 20, 30]);
    }

    #[test]
    fn test_try_fold_failure() {
        let err = vec![100_u8, 100, 100]
            .request(try_fold(0_u8, |acc: u8, x: &u8| {
                acc.checked_add(*x).ok_or("too large")
            }))
            .evaluate()
            .unwrap_err();

        assert_eq!(err.to_string(), "request 1 failed: callback failed: too large");
    }

    #[test]
    fn test_reduce() {
        let (product,) = vec![2, 3, 7]
            .request(reduce(|a: i64, b: &i64| a * b))
            .evaluate()
            .unwrap();
        assert_eq!(product, 42);
    }

    #[test]
    fn test_reduce_on_empty_fails() {
        let err = Vec::<i32>::new()
            .request(reduce(|a: i32, b: &i32| a.max(*b)))
            .evaluate()
            .unwrap_err();
        assert!(matches!(err.into_failure().cause(), ReduceError::Empty));
    }
}
