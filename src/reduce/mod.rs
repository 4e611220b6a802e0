//! The standard reduction library
//!
//! Every function here returns a [`Consumer`](crate::Consumer) that can be
//! registered on a [`Query`](crate::Query) or a [`Batch`](crate::Batch). Consumers
//! are immutable and cheap to share; the state for one evaluation lives in the sink
//! each consumer creates.
//!
//! | Family | Consumers |
//! |--------|-----------|
//! | Counting | [`count`], [`count_where`], [`try_count_where`] |
//! | Numeric | [`sum`], [`average`], [`min`], [`max`], [`min_by_key`], [`max_by_key`] |
//! | Quantifiers | [`any`], [`try_any`], [`non_empty`], [`all`], [`try_all`], [`contains`] |
//! | Elements | [`first`], [`first_where`], [`first_or_none`], [`last`], [`last_or_none`], [`single`], [`single_or_none`], [`element_at`], [`element_at_or_none`] |
//! | Equality | [`sequence_equal`], [`sequence_equal_by`], [`try_sequence_equal_by`] |
//! | Folding | [`fold`], [`try_fold`], [`reduce`] |
//! | Collecting | [`to_vec`], [`to_hash_set`], [`to_hash_map`], [`group_by`], [`distinct`] |
//!
//! Consumers that can decide their result early (quantifiers, element lookups,
//! sequence equality) stop asking for input as soon as they can. Traversal only ends
//! early once every registered consumer has stopped.
//!
//! [`ConsumerExt`] adapts any consumer: [`map`](ConsumerExt::map) the result,
//! [`select`](ConsumerExt::select) a projection of each element,
//! [`filter`](ConsumerExt::filter) elements, or [`take`](ConsumerExt::take) a prefix.
//!
//! ```
//! use onepass::reduce::{average, count, max_by_key, ConsumerExt};
//! use onepass::SourceExt;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Order {
//!     id: u32,
//!     total: f64,
//! }
//!
//! let orders = vec![
//!     Order { id: 1, total: 12.5 },
//!     Order { id: 2, total: 99.0 },
//!     Order { id: 3, total: 40.0 },
//! ];
//!
//! let (n, mean, biggest) = orders
//!     .request(count())
//!     .and(average().select(|o: &Order| o.total))
//!     .and(max_by_key(|o: &Order| o.total as u64).map(|o: Order| o.id))
//!     .evaluate()
//!     .unwrap();
//!
//! assert_eq!(n, 3);
//! assert!((mean - 50.5).abs() < 1e-9);
//! assert_eq!(biggest, 2);
//! ```

macro_rules! opaque_debug {
    ($name:ident $(< $($param:ident),+ >)?) => {
        impl$(< $($param),+ >)? ::std::fmt::Debug for $name$(< $($param),+ >)? {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($name)).finish_non_exhaustive()
            }
        }
    };
}

mod adapt;
mod collect;
mod count;
mod element;
mod equality;
mod fold;
mod numeric;
mod predicate;

pub use adapt::{ConsumerExt, Filter, FilterSink, Map, MapSink, Select, SelectSink, Take, TakeSink};
pub use collect::{
    distinct, group_by, to_hash_map, to_hash_set, to_vec, Distinct, DistinctSink, GroupBy,
    GroupBySink, ToHashMap, ToHashMapSink, ToHashSet, ToHashSetSink, ToVec, ToVecSink,
};
pub use count::{count, count_where, try_count_where, Count, CountSink, CountWhere, CountWhereSink};
pub use element::{
    element_at, element_at_or_none, first, first_or_none, first_where, last, last_or_none, single,
    single_or_none, Absence, ElementAt, ElementAtSink, First, FirstSink, FirstWhere,
    FirstWhereSink, Last, LastSink, OrNone, Required, Single, SingleSink,
};
pub use equality::{
    sequence_equal, sequence_equal_by, try_sequence_equal_by, ElementComparer, SequenceEqual,
    SequenceEqualSink, UsePartialEq,
};
pub use fold::{fold, reduce, try_fold, Fold, FoldSink, Reduce, ReduceSink, TryFold, TryFoldSink};
pub use numeric::{
    average, max, max_by_key, min, min_by_key, sum, Average, AverageSink, Extreme, ExtremeBy,
    ExtremeBySink, ExtremeSink, Sum, SumSink, Summable,
};
pub use predicate::{
    all, any, contains, non_empty, try_all, try_any, All, AllSink, Any, AnySink, Contains,
    ContainsSink, NonEmpty, NonEmptySink, PlainFn, Predicate, TryFn,
};

use crate::error::{BoxError, ReduceError};

/// Run a caller-supplied fallible callback, wrapping its failure.
pub(crate) fn callback<R, E>(result: Result<R, E>) -> Result<R, ReduceError>
where
    E: Into<BoxError>,
{
    result.map_err(ReduceError::callback)
}
