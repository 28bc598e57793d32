pub mod bloom;
pub mod compare;
pub mod hash_set;

/// A set that answers membership queries, exactly or approximately.
pub trait SetMembership<T: ?Sized> {
    fn contains(&self, item: &T) -> bool;
    fn insert(&mut self, item: &T);
}
