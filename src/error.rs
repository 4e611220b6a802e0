//! Error types for reductions and evaluations
//!
//! Three layers of failure exist during an evaluation:
//!
//! - [`ReduceError`]: a single reduction has no valid result, or caller-supplied
//!   logic (a predicate, selector or comparer) failed.
//! - [`RequestFailure`]: a [`ReduceError`] tagged with the 1-based position of the
//!   request that produced it.
//! - [`EvaluationError`]: either a failure of the source itself, which belongs to no
//!   request, or a [`RequestFailure`].
//!
//! # Example
//!
//! ```
//! use onepass::reduce::{count, first};
//! use onepass::{EvaluationError, ReduceError, SourceExt};
//!
//! let empty: Vec<i32> = Vec::new();
//! let err = empty.request(count()).and(first()).evaluate().unwrap_err();
//!
//! assert_eq!(err.position(), Some(2));
//! match err {
//!     EvaluationError::Request(failure) => {
//!         assert!(matches!(failure.cause(), ReduceError::Empty));
//!     }
//!     EvaluationError::Source(never) => match never {},
//! }
//! ```

use std::convert::Infallible;
use std::error::Error as StdError;
use std::fmt;

/// Boxed error produced by caller-supplied logic.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Why a single reduction could not produce a result.
#[derive(Debug)]
pub enum ReduceError {
    /// The reduction needs at least one element and the sequence had none.
    Empty,
    /// No element satisfied the predicate.
    NoMatch,
    /// The reduction needs exactly one element and saw more.
    MoreThanOne,
    /// A positional lookup ran past the end of the sequence.
    OutOfRange {
        /// The requested index.
        index: usize,
        /// How many elements the sequence actually had.
        len: usize,
    },
    /// Arithmetic overflowed while accumulating.
    Overflow,
    /// Two elements mapped to the same key in a map materialization.
    DuplicateKey,
    /// A caller-supplied predicate, selector or comparer failed.
    Callback(BoxError),
}

impl ReduceError {
    /// Wrap a failure raised by caller-supplied logic.
    ///
    /// ```
    /// use onepass::ReduceError;
    ///
    /// let err = ReduceError::callback("comparer rejected input");
    /// assert_eq!(err.to_string(), "callback failed: comparer rejected input");
    /// ```
    pub fn callback(error: impl Into<BoxError>) -> Self {
        ReduceError::Callback(error.into())
    }

    /// Returns true if the error came from caller-supplied logic.
    pub fn is_callback(&self) -> bool {
        matches!(self, ReduceError::Callback(_))
    }
}

impl fmt::Display for ReduceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReduceError::Empty => write!(f, "sequence contains no elements"),
            ReduceError::NoMatch => write!(f, "sequence contains no matching element"),
            ReduceError::MoreThanOne => write!(f, "sequence contains more than one element"),
            ReduceError::OutOfRange { index, len } => write!(
                f,
                "index {} is out of range for a sequence of {} elements",
                index, len
            ),
            ReduceError::Overflow => write!(f, "arithmetic overflow"),
            ReduceError::DuplicateKey => write!(f, "an element with the same key was already added"),
            ReduceError::Callback(e) => write!(f, "callback failed: {}", e),
        }
    }
}

impl StdError for ReduceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ReduceError::Callback(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// A reduction failure attributed to the request that raised it.
#[derive(Debug)]
pub struct RequestFailure {
    position: usize,
    cause: ReduceError,
}

impl RequestFailure {
    /// Create a failure for the request at `position` (1-based).
    pub fn new(position: usize, cause: ReduceError) -> Self {
        Self { position, cause }
    }

    /// The 1-based position of the failing request, in registration order.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The error raised by the reduction.
    pub fn cause(&self) -> &ReduceError {
        &self.cause
    }

    /// Consume the failure and return the underlying reduction error.
    pub fn into_cause(self) -> ReduceError {
        self.cause
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request {} failed: {}", self.position, self.cause)
    }
}

impl StdError for RequestFailure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.cause)
    }
}

/// Error returned by an evaluation.
///
/// `E` is the error type of the source. In-memory sources use [`Infallible`], and
/// [`EvaluationError::into_failure`] strips the impossible variant.
#[derive(Debug)]
pub enum EvaluationError<E> {
    /// Opening or advancing the source failed. Not attributable to any request.
    Source(E),
    /// A request failed; later requests produced no result.
    Request(RequestFailure),
}

impl<E> EvaluationError<E> {
    /// The 1-based position of the failing request, if a request failed.
    pub fn position(&self) -> Option<usize> {
        match self {
            EvaluationError::Source(_) => None,
            EvaluationError::Request(failure) => Some(failure.position()),
        }
    }

    /// Returns true if the source itself failed.
    pub fn is_source(&self) -> bool {
        matches!(self, EvaluationError::Source(_))
    }

    /// Returns the request failure, if that is what this is.
    pub fn request_failure(&self) -> Option<&RequestFailure> {
        match self {
            EvaluationError::Source(_) => None,
            EvaluationError::Request(failure) => Some(failure),
        }
    }

    /// Transform the source error.
    pub fn map_source<F, E2>(self, f: F) -> EvaluationError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            EvaluationError::Source(e) => EvaluationError::Source(f(e)),
            EvaluationError::Request(failure) => EvaluationError::Request(failure),
        }
    }
}

impl EvaluationError<Infallible> {
    /// Extract the request failure from an evaluation over an infallible source.
    ///
    /// ```
    /// use onepass::reduce::single;
    /// use onepass::SourceExt;
    ///
    /// let failure = vec![1, 2].request(single()).evaluate().unwrap_err().into_failure();
    /// assert_eq!(failure.position(), 1);
    /// ```
    pub fn into_failure(self) -> RequestFailure {
        match self {
            EvaluationError::Source(never) => match never {},
            EvaluationError::Request(failure) => failure,
        }
    }
}

impl<E> From<RequestFailure> for EvaluationError<E> {
    fn from(failure: RequestFailure) -> Self {
        EvaluationError::Request(failure)
    }
}

impl<E: fmt::Display> fmt::Display for EvaluationError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::Source(e) => write!(f, "source failed: {}", e),
            EvaluationError::Request(failure) => fmt::Display::fmt(failure, f),
        }
    }
}

impl<E: StdError + 'static> StdError for EvaluationError<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            EvaluationError::Source(e) => Some(e),
            EvaluationError::Request(failure) => Some(failure),
        }
    }
}
