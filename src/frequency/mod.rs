use num_traits::{Bounded, SaturatingAdd, Unsigned};

pub mod cms;

/// Unsigned counter that saturates at its maximum instead of wrapping.
pub trait Counter: Copy + Ord + Unsigned + Bounded + SaturatingAdd {}

impl<C> Counter for C where C: Copy + Ord + Unsigned + Bounded + SaturatingAdd {}

pub trait Frequency<T: ?Sized> {
    type Count;

    /// Never less than the number of times `item` was inserted.
    fn count(&self, item: &T) -> Self::Count;
    fn insert(&mut self, item: &T);
}
