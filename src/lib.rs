//! # onepass
//!
//! > *Many questions, one traversal.*
//!
//! Evaluate several independent reductions over the same sequence while walking
//! that sequence exactly once.
//!
//! ## Why
//!
//! Some sequences are expensive or side-effecting to walk: a database cursor, a
//! network stream, a generator that logs. Asking "how many rows?", "is any row
//! flagged?" and "what is the first row?" one after another would walk it three
//! times. **onepass** registers all three questions first, then pulls each element
//! once and lends it to every question that still needs input. Traversal stops as
//! soon as every question has its answer.
//!
//! ## Quick Example
//!
//! ```rust
//! use onepass::reduce::{any, count, first};
//! use onepass::SourceExt;
//!
//! let rows = vec![3, 8, 5, 1];
//!
//! let (n, flagged, head) = rows
//!     .request(count())
//!     .and(any(|r: &i32| *r > 7))
//!     .and(first())
//!     .evaluate()
//!     .unwrap();
//!
//! assert_eq!(n, 4);
//! assert!(flagged);
//! assert_eq!(head, 3);
//! ```
//!
//! ## Pieces
//!
//! - [`Consumer`] / [`Sink`]: a reusable reduction and its per-evaluation state.
//! - [`Source`] / [`Cursor`]: a sequence that can be walked once per evaluation.
//! - [`Query`]: up to [`MAX_REQUESTS`] typed requests bound to one source.
//! - [`Batch`]: any number of requests sharing one result type.
//! - [`stream`]: the same holders over `futures` streams.
//! - [`reduce`]: the standard consumer library.
//!
//! ## Errors
//!
//! Evaluation returns [`EvaluationError`]: either the source itself failed, or a
//! [`RequestFailure`] naming the first request (1-based, in registration order)
//! whose reduction failed. Requests after it produce nothing.
//!
//! ## Features
//!
//! - `tracing`: emit a `debug` span per evaluation and events for traversal
//!   completion and request faults.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod batch;
pub mod driver;
pub mod error;
pub mod query;
pub mod reduce;
pub mod sink;
pub mod source;
pub mod stream;
pub mod testing;

// Re-exports
pub use batch::Batch;
pub use error::{BoxError, EvaluationError, ReduceError, RequestFailure};
pub use query::{query, Query, SourceExt, MAX_REQUESTS};
pub use sink::{BoxedConsumer, Consumer, Sink};
pub use source::{Cursor, Sequence, Source};
pub use stream::StreamSource;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::batch::Batch;
    pub use crate::error::{EvaluationError, ReduceError, RequestFailure};
    pub use crate::query::{query, Query, SourceExt};
    pub use crate::reduce::ConsumerExt;
    pub use crate::sink::{Consumer, Sink};
    pub use crate::source::{Sequence, Source};
    pub use crate::stream::StreamSource;
}
