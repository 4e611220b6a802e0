//! Arithmetic and ordering reductions.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::ReduceError;
use crate::sink::{Consumer, Sink};

/// Numbers that [`sum`] and [`average`] know how to add.
///
/// Integer addition is checked; floats follow IEEE-754.
pub trait Summable: Copy {
    /// The additive identity.
    const ZERO: Self;

    /// `self + rhs`, or `None` on overflow.
    fn checked_sum(self, rhs: Self) -> Option<Self>;

    /// Lossy conversion used by [`average`].
    fn to_f64(self) -> f64;
}

macro_rules! impl_summable_int {
    ($($t:ty),+) => {
        $(
            impl Summable for $t {
                const ZERO: Self = 0;

                fn checked_sum(self, rhs: Self) -> Option<Self> {
                    <$t>::checked_add(self, rhs)
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )+
    };
}

macro_rules! impl_summable_float {
    ($($t:ty),+) => {
        $(
            impl Summable for $t {
                const ZERO: Self = 0.0;

                fn checked_sum(self, rhs: Self) -> Option<Self> {
                    Some(self + rhs)
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )+
    };
}

impl_summable_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_summable_float!(f32, f64);

/// Sum of the elements. Created by [`sum`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

/// Sink for [`Sum`].
#[derive(Debug)]
pub struct SumSink<T> {
    total: T,
}

/// Sum of every element; zero for an empty sequence.
///
/// Integer overflow fails the request with [`ReduceError::Overflow`].
///
/// ```
/// use onepass::reduce::sum;
/// use onepass::{ReduceError, SourceExt};
///
/// let (total,) = vec![1_u8, 2, 3].request(sum()).evaluate().unwrap();
/// assert_eq!(total, 6);
///
/// let err = vec![200_u8, 100].request(sum()).evaluate().unwrap_err();
/// assert!(matches!(err.into_failure().cause(), ReduceError::Overflow));
/// ```
pub fn sum() -> Sum {
    Sum
}

impl<T: Summable> Consumer<T> for Sum {
    type Output = T;
    type Sink = SumSink<T>;

    fn create_sink(&self) -> SumSink<T> {
        SumSink { total: T::ZERO }
    }
}

impl<T: Summable> Sink<T> for SumSink<T> {
    type Output = T;

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        self.total = self
            .total
            .checked_sum(*item)
            .ok_or(ReduceError::Overflow)?;
        Ok(())
    }

    fn finish(self) -> Result<T, ReduceError> {
        Ok(self.total)
    }
}

/// Arithmetic mean of the elements. Created by [`average`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Average;

/// Sink for [`Average`].
#[derive(Debug, Default)]
pub struct AverageSink {
    total: f64,
    seen: usize,
}

/// Mean of every element as `f64`.
///
/// Fails with [`ReduceError::Empty`] when there are no elements.
pub fn average() -> Average {
    Average
}

impl<T: Summable> Consumer<T> for Average {
    type Output = f64;
    type Sink = AverageSink;

    fn create_sink(&self) -> AverageSink {
        AverageSink::default()
    }
}

impl<T: Summable> Sink<T> for AverageSink {
    type Output = f64;

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        self.total += item.to_f64();
        self.seen += 1;
        Ok(())
    }

    fn finish(self) -> Result<f64, ReduceError> {
        if self.seen == 0 {
            return Err(ReduceError::Empty);
        }
        Ok(self.total / self.seen as f64)
    }
}

/// Smallest or largest element. Created by [`min`] and [`max`].
#[derive(Debug, Clone, Copy)]
pub struct Extreme {
    keep: Ordering,
}

/// Sink for [`Extreme`].
#[derive(Debug)]
pub struct ExtremeSink<T> {
    keep: Ordering,
    best: Option<T>,
}

/// Smallest element; the first one wins ties.
///
/// Fails with [`ReduceError::Empty`] when there are no elements.
pub fn min() -> Extreme {
    Extreme {
        keep: Ordering::Less,
    }
}

/// Largest element; the first one wins ties.
///
/// Fails with [`ReduceError::Empty`] when there are no elements.
pub fn max() -> Extreme {
    Extreme {
        keep: Ordering::Greater,
    }
}

impl<T: Ord + Clone> Consumer<T> for Extreme {
    type Output = T;
    type Sink = ExtremeSink<T>;

    fn create_sink(&self) -> ExtremeSink<T> {
        ExtremeSink {
            keep: self.keep,
            best: None,
        }
    }
}

impl<T: Ord + Clone> Sink<T> for ExtremeSink<T> {
    type Output = T;

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        let replace = match &self.best {
            Some(best) => item.cmp(best) == self.keep,
            None => true,
        };
        if replace {
            self.best = Some(item.clone());
        }
        Ok(())
    }

    fn finish(self) -> Result<T, ReduceError> {
        self.best.ok_or(ReduceError::Empty)
    }
}

/// Element with the smallest or largest key.
///
/// Created by [`min_by_key`] and [`max_by_key`].
pub struct ExtremeBy<F> {
    key: Arc<F>,
    keep: Ordering,
}

/// Sink for [`ExtremeBy`].
pub struct ExtremeBySink<F, T, K> {
    key: Arc<F>,
    keep: Ordering,
    best: Option<(K, T)>,
}

opaque_debug!(ExtremeBy<F>);
opaque_debug!(ExtremeBySink<F, T, K>);

/// Element whose key is smallest; the first one wins ties.
pub fn min_by_key<T, K, F>(key: F) -> ExtremeBy<F>
where
    F: Fn(&T) -> K,
    K: Ord,
{
    ExtremeBy {
        key: Arc::new(key),
        keep: Ordering::Less,
    }
}

/// Element whose key is largest; the first one wins ties.
pub fn max_by_key<T, K, F>(key: F) -> ExtremeBy<F>
where
    F: Fn(&T) -> K,
    K: Ord,
{
    ExtremeBy {
        key: Arc::new(key),
        keep: Ordering::Greater,
    }
}

impl<T, K, F> Consumer<T> for ExtremeBy<F>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    type Output = T;
    type Sink = ExtremeBySink<F, T, K>;

    fn create_sink(&self) -> Self::Sink {
        ExtremeBySink {
            key: Arc::clone(&self.key),
            keep: self.keep,
            best: None,
        }
    }
}

impl<T, K, F> Sink<T> for ExtremeBySink<F, T, K>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    type Output = T;

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        let key = (self.key)(item);
        let replace = match &self.best {
            Some((best, _)) => key.cmp(best) == self.keep,
            None => true,
        };
        if replace {
            self.best = Some((key, item.clone()));
        }
        Ok(())
    }

    fn finish(self) -> Result<T, ReduceError> {
        self.best.map(|(_, item)| item).ok_or(ReduceError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceExt;

    #[test]
    fn test_sum_and_average() {
        let (total, mean) = vec![2, 4, 9]
            .request(sum())
            .and(average())
            .evaluate()
            .unwrap();

        assert_eq!(total, 15);
        assert!((mean - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sum_of_empty_is_zero() {
        let (total,) = Vec::<i64>::new().request(sum()).evaluate().unwrap();
        assert_eq!(total, 0);
    }

    #[test]
    fn test_sum_overflow_faults() {
        let err = vec![i32::MAX, 1].request(sum()).evaluate().unwrap_err();
        assert_eq!(err.position(), Some(1));
        assert!(matches!(err.into_failure().cause(), ReduceError::Overflow));
    }

    #[test]
    fn test_float_sum() {
        let (total,) = vec![0.5_f64, 0.25].request(sum()).evaluate().unwrap();
        assert!((total - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_average_of_empty_fails() {
        let err = Vec::<u32>::new().request(average()).evaluate().unwrap_err();
        assert!(matches!(err.into_failure().cause(), ReduceError::Empty));
    }

    #[test]
    fn test_min_max() {
        let (lo, hi) = vec![3, 1, 4, 1, 5]
            .request(min())
            .and(max())
            .evaluate()
            .unwrap();
        assert_eq!((lo, hi), (1, 5));
    }

    #[test]
    fn test_min_of_empty_fails() {
        let err = Vec::<i32>::new().request(min()).evaluate().unwrap_err();
        assert!(matches!(err.into_failure().cause(), ReduceError::Empty));
    }

    #[test]
    fn test_by_key_first_wins_ties() {
        let words = vec!["bb", "a", "cc", "d"];
        let (shortest, longest) = words
            .request(min_by_key(|w: &&str| w.len()))
            .and(max_by_key(|w: &&str| w.len()))
            .evaluate()
            .unwrap();

        assert_eq!(shortest, "a");
        assert_eq!(longest, "bb");
    }
}
