//! Tuple implementations of [`Requests`], [`SlotList`] and [`Append`].
//!
//! Arities 1 through [`MAX_REQUESTS`](super::MAX_REQUESTS); `Append` stops one short
//! so a full holder cannot grow.

use std::sync::Arc;

use super::{Append, Arity, Requests};
use crate::driver::SlotList;
use crate::error::{ReduceError, RequestFailure};
use crate::sink::{Consumer, Sink};

macro_rules! impl_requests {
    ($len:literal; $($idx:tt $C:ident),+) => {
        impl<$($C),+> Arity for ($(Arc<$C>,)+) {
            const LEN: usize = $len;
        }

        impl<T, $($C),+> Requests<T> for ($(Arc<$C>,)+)
        where
            $($C: Consumer<T>,)+
        {
            type Output = ($(<$C as Consumer<T>>::Output,)+);
            type Slots = ($(<$C as Consumer<T>>::Sink,)+);

            fn create_slots(&self) -> Self::Slots {
                ($(<$C as Consumer<T>>::create_sink(&self.$idx),)+)
            }
        }

        impl<T, $($C),+> SlotList<T> for ($($C,)+)
        where
            $($C: Sink<T>,)+
        {
            type Output = ($(<$C as Sink<T>>::Output,)+);

            fn len(&self) -> usize {
                $len
            }

            fn wants_more(&self, index: usize) -> bool {
                match index {
                    $($idx => <$C as Sink<T>>::wants_more(&self.$idx),)+
                    _ => false,
                }
            }

            fn accept(&mut self, index: usize, item: &T) -> Result<(), ReduceError> {
                match index {
                    $($idx => <$C as Sink<T>>::accept(&mut self.$idx, item),)+
                    _ => Ok(()),
                }
            }

            fn finish(self) -> Result<Self::Output, RequestFailure> {
                Ok(($(
                    <$C as Sink<T>>::finish(self.$idx)
                        .map_err(|cause| RequestFailure::new($idx + 1, cause))?,
                )+))
            }
        }
    };
}

macro_rules! impl_append {
    ($($idx:tt $C:ident),+) => {
        impl<$($C,)+ Next> Append<Next> for ($(Arc<$C>,)+) {
            type Appended = ($(Arc<$C>,)+ Arc<Next>);

            fn append(&self, next: Arc<Next>) -> Self::Appended {
                ($(Arc::clone(&self.$idx),)+ next)
            }
        }
    };
}

impl_requests!(1; 0 C0);
impl_requests!(2; 0 C0, 1 C1);
impl_requests!(3; 0 C0, 1 C1, 2 C2);
impl_requests!(4; 0 C0, 1 C1, 2 C2, 3 C3);
impl_requests!(5; 0 C0, 1 C1, 2 C2, 3 C3, 4 C4);
impl_requests!(6; 0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5);
impl_requests!(7; 0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6);
impl_requests!(8; 0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7);
impl_requests!(9; 0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7, 8 C8);
impl_requests!(10; 0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7, 8 C8, 9 C9);
impl_requests!(11; 0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7, 8 C8, 9 C9, 10 C10);
impl_requests!(12; 0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7, 8 C8, 9 C9, 10 C10, 11 C11);
impl_requests!(13; 0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7, 8 C8, 9 C9, 10 C10, 11 C11, 12 C12);
impl_requests!(14; 0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7, 8 C8, 9 C9, 10 C10, 11 C11, 12 C12, 13 C13);
impl_requests!(15; 0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7, 8 C8, 9 C9, 10 C10, 11 C11, 12 C12, 13 C13, 14 C14);
impl_requests!(16; 0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7, 8 C8, 9 C9, 10 C10, 11 C11, 12 C12, 13 C13, 14 C14, 15 C15);

impl_append!(0 C0);
impl_append!(0 C0, 1 C1);
impl_append!(0 C0, 1 C1, 2 C2);
impl_append!(0 C0, 1 C1, 2 C2, 3 C3);
impl_append!(0 C0, 1 C1, 2 C2, 3 C3, 4 C4);
impl_append!(0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5);
impl_append!(0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6);
impl_append!(0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7);
impl_append!(0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7, 8 C8);
impl_append!(0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7, 8 C8, 9 C9);
impl_append!(0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7, 8 C8, 9 C9, 10 C10);
impl_append!(0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7, 8 C8, 9 C9, 10 C10, 11 C11);
impl_append!(0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7, 8 C8, 9 C9, 10 C10, 11 C11, 12 C12);
impl_append!(0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7, 8 C8, 9 C9, 10 C10, 11 C11, 12 C12, 13 C13);
impl_append!(0 C0, 1 C1, 2 C2, 3 C3, 4 C4, 5 C5, 6 C6, 7 C7, 8 C8, 9 C9, 10 C10, 11 C11, 12 C12, 13 C13, 14 C14);
