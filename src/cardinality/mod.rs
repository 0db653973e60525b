pub mod hll;
mod registers;

pub trait Cardinality<T: ?Sized> {
    /// Approximate number of distinct items inserted so far.
    fn count(&self) -> u64;
    fn insert(&mut self, item: &T);
}
