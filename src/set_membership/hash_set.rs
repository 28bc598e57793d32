use crate::set_membership::SetMembership;
use std::collections::HashSet;

impl SetMembership<str> for HashSet<String> {
    fn contains(&self, item: &str) -> bool {
        HashSet::<String>::contains(self, item)
    }

    fn insert(&mut self, item: &str) {
        HashSet::<String>::insert(self, item.to_owned());
    }
}
