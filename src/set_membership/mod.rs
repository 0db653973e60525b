pub mod bloom;

pub trait SetMembership<T: ?Sized> {
    /// `false` means `item` was never inserted; `true` may be a false positive.
    fn contains(&self, item: &T) -> bool;
    fn insert(&mut self, item: &T);
}
