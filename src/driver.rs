//! The fan-out driver
//!
//! One traversal, many sinks. The driver pulls an element from the cursor, lends
//! it to every sink that still wants input (in registration order), and repeats
//! until the cursor is exhausted or no sink wants anything more.
//!
//! A sink whose `accept` fails halts the traversal on the spot: the remaining
//! sinks do not see that element, nothing more is pulled, and the failure is
//! reported at the sink's position. No sink is finished in that case.

use std::pin::pin;

use futures::{Stream, StreamExt};

use crate::error::{EvaluationError, ReduceError, RequestFailure};
use crate::sink::Sink;
use crate::source::{Cursor, Source};

/// An ordered, fixed set of sinks the driver can address by index.
///
/// Implemented for tuples of sinks (typed requests) and for `Vec` (type-erased
/// batches).
pub trait SlotList<T> {
    /// Results of every sink, in registration order.
    type Output;

    /// Number of sinks.
    fn len(&self) -> usize;

    /// Whether there are no sinks at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the sink at `index` wants more input.
    fn wants_more(&self, index: usize) -> bool;

    /// Lend `item` to the sink at `index`.
    fn accept(&mut self, index: usize, item: &T) -> Result<(), ReduceError>;

    /// Finish every sink in order, stopping at the first failure.
    fn finish(self) -> Result<Self::Output, RequestFailure>;
}

impl<T, S> SlotList<T> for Vec<S>
where
    S: Sink<T>,
{
    type Output = Vec<S::Output>;

    fn len(&self) -> usize {
        <[S]>::len(self)
    }

    fn wants_more(&self, index: usize) -> bool {
        self.get(index).is_some_and(|sink| sink.wants_more())
    }

    fn accept(&mut self, index: usize, item: &T) -> Result<(), ReduceError> {
        match self.get_mut(index) {
            Some(sink) => sink.accept(item),
            None => Ok(()),
        }
    }

    fn finish(self) -> Result<Vec<S::Output>, RequestFailure> {
        self.into_iter()
            .enumerate()
            .map(|(index, sink)| {
                sink.finish()
                    .map_err(|cause| RequestFailure::new(index + 1, cause))
            })
            .collect()
    }
}

/// Summary of one traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(crate) struct Traversal {
    /// Elements pulled from the source.
    pub pulled: usize,
    /// True if traversal stopped because no sink wanted more input.
    pub short_circuited: bool,
}

/// Per-traversal bookkeeping shared by the blocking and async loops.
struct Fanout {
    pulled: usize,
}

impl Fanout {
    fn new() -> Self {
        Self { pulled: 0 }
    }

    fn needs_input<T, L: SlotList<T>>(&self, slots: &L) -> bool {
        (0..slots.len()).any(|index| slots.wants_more(index))
    }

    fn dispatch<T, L: SlotList<T>>(
        &mut self,
        slots: &mut L,
        item: &T,
    ) -> Result<(), RequestFailure> {
        self.pulled += 1;
        #[cfg(feature = "tracing")]
        tracing::trace!(element = self.pulled, "dispatching element");

        for index in 0..slots.len() {
            if !slots.wants_more(index) {
                continue;
            }
            if let Err(cause) = slots.accept(index, item) {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    position = index + 1,
                    element = self.pulled,
                    "request faulted during traversal"
                );
                return Err(RequestFailure::new(index + 1, cause));
            }
        }
        Ok(())
    }

    fn complete(self, short_circuited: bool) -> Traversal {
        Traversal {
            pulled: self.pulled,
            short_circuited,
        }
    }
}

/// Drive `slots` over a blocking cursor.
///
/// Returns as soon as the cursor fails or a sink rejects an element.
pub(crate) fn run<C, L>(
    cursor: &mut C,
    slots: &mut L,
) -> Result<Traversal, EvaluationError<C::Error>>
where
    C: Cursor,
    L: SlotList<C::Item>,
{
    let mut fanout = Fanout::new();
    loop {
        if !fanout.needs_input::<C::Item, L>(slots) {
            return Ok(fanout.complete(true));
        }
        match cursor.try_next().map_err(EvaluationError::Source)? {
            Some(item) => fanout.dispatch(slots, &item)?,
            None => return Ok(fanout.complete(false)),
        }
    }
}

/// Drive `slots` over a stream of fallible elements.
pub(crate) async fn run_stream<St, T, E, L>(
    stream: St,
    slots: &mut L,
) -> Result<Traversal, EvaluationError<E>>
where
    St: Stream<Item = Result<T, E>>,
    L: SlotList<T>,
{
    let mut stream = pin!(stream);
    let mut fanout = Fanout::new();
    loop {
        if !fanout.needs_input::<T, L>(slots) {
            return Ok(fanout.complete(true));
        }
        match stream.next().await {
            Some(item) => fanout.dispatch(slots, &item.map_err(EvaluationError::Source)?)?,
            None => return Ok(fanout.complete(false)),
        }
    }
}

/// Open `source`, drive `slots` over it, release the cursor, then assemble results.
///
/// On a cursor or sink failure the cursor and every sink are dropped unfinished.
pub(crate) fn evaluate<S, L>(source: &S, mut slots: L) -> Result<L::Output, EvaluationError<S::Error>>
where
    S: Source + ?Sized,
    L: SlotList<S::Item>,
{
    let traversal = {
        let mut cursor = source.open().map_err(EvaluationError::Source)?;
        run(&mut cursor, &mut slots)?
    };
    trace_traversal(&traversal);
    Ok(slots.finish()?)
}

/// Async counterpart of [`evaluate`]; the stream is dropped before assembly.
pub(crate) async fn evaluate_stream<St, T, E, L>(
    stream: St,
    mut slots: L,
) -> Result<L::Output, EvaluationError<E>>
where
    St: Stream<Item = Result<T, E>>,
    L: SlotList<T>,
{
    let traversal = run_stream(stream, &mut slots).await?;
    trace_traversal(&traversal);
    Ok(slots.finish()?)
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn trace_traversal(traversal: &Traversal) {
    #[cfg(feature = "tracing")]
    tracing::debug!(
        pulled = traversal.pulled,
        short_circuited = traversal.short_circuited,
        "traversal complete"
    );
}
