//! Counting consumers.

use std::sync::Arc;

use super::predicate::{PlainFn, Predicate, TryFn};
use crate::error::{BoxError, ReduceError};
use crate::sink::{Consumer, Sink};

/// Number of elements. Created by [`count`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Count;

/// Sink for [`Count`].
#[derive(Debug, Default)]
pub struct CountSink {
    seen: usize,
}

/// Number of elements in the sequence.
///
/// ```
/// use onepass::reduce::count;
/// use onepass::SourceExt;
///
/// let (n,) = vec!['a', 'b', 'c'].request(count()).evaluate().unwrap();
/// assert_eq!(n, 3);
/// ```
pub fn count() -> Count {
    Count
}

impl<T> Consumer<T> for Count {
    type Output = usize;
    type Sink = CountSink;

    fn create_sink(&self) -> CountSink {
        CountSink::default()
    }
}

impl<T> Sink<T> for CountSink {
    type Output = usize;

    fn accept(&mut self, _item: &T) -> Result<(), ReduceError> {
        self.seen += 1;
        Ok(())
    }

    fn finish(self) -> Result<usize, ReduceError> {
        Ok(self.seen)
    }
}

/// Number of elements satisfying a predicate.
///
/// Created by [`count_where`] and [`try_count_where`].
pub struct CountWhere<P> {
    predicate: Arc<P>,
}

/// Sink for [`CountWhere`].
pub struct CountWhereSink<P> {
    predicate: Arc<P>,
    matched: usize,
}

opaque_debug!(CountWhere<P>);
opaque_debug!(CountWhereSink<P>);

/// Number of elements for which `predicate` holds.
pub fn count_where<T, F>(predicate: F) -> CountWhere<PlainFn<F>>
where
    F: Fn(&T) -> bool,
{
    CountWhere {
        predicate: Arc::new(PlainFn(predicate)),
    }
}

/// Like [`count_where`], with a predicate that may fail.
pub fn try_count_where<T, E, F>(predicate: F) -> CountWhere<TryFn<F>>
where
    F: Fn(&T) -> Result<bool, E>,
    E: Into<BoxError>,
{
    CountWhere {
        predicate: Arc::new(TryFn(predicate)),
    }
}

impl<T, P: Predicate<T>> Consumer<T> for CountWhere<P> {
    type Output = usize;
    type Sink = CountWhereSink<P>;

    fn create_sink(&self) -> CountWhereSink<P> {
        CountWhereSink {
            predicate: Arc::clone(&self.predicate),
            matched: 0,
        }
    }
}

impl<T, P: Predicate<T>> Sink<T> for CountWhereSink<P> {
    type Output = usize;

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        if self.predicate.test(item)? {
            self.matched += 1;
        }
        Ok(())
    }

    fn finish(self) -> Result<usize, ReduceError> {
        Ok(self.matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceExt;

    #[test]
    fn test_count_empty() {
        let (n,) = Vec::<u8>::new().request(count()).evaluate().unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_count_where_counts_matches() {
        let (all, odd) = vec![1, 2, 3, 4, 5]
            .request(count())
            .and(count_where(|x: &i32| x % 2 == 1))
            .evaluate()
            .unwrap();

        assert_eq!(all, 5);
        assert_eq!(odd, 3);
    }

    #[test]
    fn test_try_count_where_reports_callback_failure() {
        let err = vec!["1", "two", "3"]
            .request(try_count_where(|s: &&str| s.parse::<i32>().map(|n| n > 0)))
            .evaluate()
            .unwrap_err();

        assert_eq!(err.position(), Some(1));
        assert!(err.to_string().starts_with("request 1 failed: callback failed"));
    }
}
