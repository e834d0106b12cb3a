//! Sinks that parsed elements are pushed into.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// A collection that parsed elements can be appended to one at a time.
///
/// Array and key-value results are built through this trait, so any
/// collection implementing it can be the target of a parse.
pub trait Appender<T> {
    /// Reserve room for about `additional` more elements.
    fn reserve_items(&mut self, additional: usize) {
        let _ = additional;
    }

    /// Append one element.
    fn push_item(&mut self, item: T);
}

impl<T> Appender<T> for Vec<T> {
    fn reserve_items(&mut self, additional: usize) {
        self.reserve(additional);
    }

    fn push_item(&mut self, item: T) {
        self.push(item);
    }
}

impl<T> Appender<T> for VecDeque<T> {
    fn reserve_items(&mut self, additional: usize) {
        self.reserve(additional);
    }

    fn push_item(&mut self, item: T) {
        self.push_back(item);
    }
}

impl<T: Ord> Appender<T> for BTreeSet<T> {
    fn push_item(&mut self, item: T) {
        self.insert(item);
    }
}

impl<T: Hash + Eq> Appender<T> for HashSet<T> {
    fn reserve_items(&mut self, additional: usize) {
        self.reserve(additional);
    }

    fn push_item(&mut self, item: T) {
        self.insert(item);
    }
}

/// Later duplicates of a key replace earlier ones.
impl<K: Ord, V> Appender<(K, V)> for BTreeMap<K, V> {
    fn push_item(&mut self, (key, value): (K, V)) {
        self.insert(key, value);
    }
}

/// Later duplicates of a key replace earlier ones.
impl<K: Hash + Eq, V> Appender<(K, V)> for HashMap<K, V> {
    fn reserve_items(&mut self, additional: usize) {
        self.reserve(additional);
    }

    fn push_item(&mut self, (key, value): (K, V)) {
        self.insert(key, value);
    }
}

/// Drain `items` into a fresh collection of type `C`.
pub fn collect_into<T, C: Appender<T> + Default>(items: impl ExactSizeIterator<Item = T>) -> C {
    let mut out = C::default();
    out.reserve_items(items.len());
    for item in items {
        out.push_item(item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_and_maps_deduplicate() {
        let set: BTreeSet<i32> = collect_into(vec![3, 1, 3, 2].into_iter());
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);

        let map: HashMap<&str, i32> = collect_into(vec![("a", 1), ("b", 2), ("a", 3)].into_iter());
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], 3);
    }

    #[test]
    fn sequences_keep_order() {
        let v: VecDeque<char> = collect_into("abc".chars().collect::<Vec<_>>().into_iter());
        assert_eq!(v, VecDeque::from(vec!['a', 'b', 'c']));
    }
}
