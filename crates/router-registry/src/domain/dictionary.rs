//! # Router Dictionary
//!
//! Ordered, unique-key storage of router descriptions keyed by the 256-bit
//! address hash.
//!
//! [`RouterDict`] is a plain map and may be empty (batch messages carry empty
//! maps). [`RouterStore`] is what the registry persists: it is either absent
//! or holds a non-empty map, never a present-but-empty one.

use crate::codec::Maybe;
use crate::domain::value_objects::{RouterDescription, U256};
use std::collections::BTreeMap;

// =============================================================================
// ROUTER DICT
// =============================================================================

/// Ordered map from address hash to router description.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouterDict {
    entries: BTreeMap<U256, RouterDescription>,
}

impl RouterDict {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a key.
    #[must_use]
    pub fn get(&self, key: &U256) -> Option<&RouterDescription> {
        self.entries.get(key)
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &U256) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or overwrites.
    pub fn upsert(&mut self, key: U256, value: RouterDescription) {
        self.entries.insert(key, value);
    }

    /// Removes a key, returning whether it was present.
    pub fn remove(&mut self, key: &U256) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&U256, &RouterDescription)> {
        self.entries.iter()
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &U256> {
        self.entries.keys()
    }
}

impl FromIterator<(U256, RouterDescription)> for RouterDict {
    fn from_iter<I: IntoIterator<Item = (U256, RouterDescription)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RouterDict {
    type Item = (&'a U256, &'a RouterDescription);
    type IntoIter = std::collections::btree_map::Iter<'a, U256, RouterDescription>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// =============================================================================
// ROUTER STORE
// =============================================================================

/// Persisted router set: absent, or a non-empty [`RouterDict`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouterStore {
    routers: Maybe<RouterDict>,
}

impl RouterStore {
    /// An absent store.
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    /// Wraps a map, collapsing an empty one to absent.
    #[must_use]
    pub fn from_dict(dict: RouterDict) -> Self {
        if dict.is_empty() {
            Self::absent()
        } else {
            Self {
                routers: Maybe::Just(dict),
            }
        }
    }

    /// Wraps a decoded optional map, collapsing `Just(empty)` to absent.
    #[must_use]
    pub fn from_maybe(routers: Maybe<RouterDict>) -> Self {
        match routers {
            Maybe::Nothing => Self::absent(),
            Maybe::Just(dict) => Self::from_dict(dict),
        }
    }

    /// The raw optional value, as persisted and as sent in responses.
    #[must_use]
    pub fn as_maybe(&self) -> &Maybe<RouterDict> {
        &self.routers
    }

    /// Returns true when no routers are stored.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.routers.is_nothing()
    }

    /// Number of stored routers.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.routers {
            Maybe::Nothing => 0,
            Maybe::Just(dict) => dict.len(),
        }
    }

    /// Returns true if no routers are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_absent()
    }

    /// Looks up a router.
    #[must_use]
    pub fn get(&self, key: &U256) -> Option<&RouterDescription> {
        match &self.routers {
            Maybe::Nothing => None,
            Maybe::Just(dict) => dict.get(key),
        }
    }

    /// Inserts or overwrites a router.
    pub fn upsert(&mut self, key: U256, value: RouterDescription) {
        match &mut self.routers {
            Maybe::Just(dict) => dict.upsert(key, value),
            Maybe::Nothing => {
                let mut dict = RouterDict::new();
                dict.upsert(key, value);
                self.routers = Maybe::Just(dict);
            }
        }
    }

    /// Removes a router, collapsing to absent when the last one goes.
    pub fn remove(&mut self, key: &U256) -> bool {
        let Maybe::Just(dict) = &mut self.routers else {
            return false;
        };
        let removed = dict.remove(key);
        if dict.is_empty() {
            self.routers = Maybe::Nothing;
        }
        removed
    }

    /// Discards everything and installs `dict` (absent if empty).
    pub fn replace_all(&mut self, dict: RouterDict) {
        *self = Self::from_dict(dict);
    }

    /// Stored entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&U256, &RouterDescription)> {
        let dict = match &self.routers {
            Maybe::Nothing => None,
            Maybe::Just(dict) => Some(dict),
        };
        dict.into_iter().flatten()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(id: u64) -> RouterDescription {
        RouterDescription {
            router_id: U256::from(id),
            ..RouterDescription::default()
        }
    }

    #[test]
    fn test_store_starts_absent() {
        let store = RouterStore::absent();
        assert!(store.is_absent());
        assert_eq!(store.as_maybe(), &Maybe::Nothing);
        assert_eq!(store.get(&U256::one()), None);
    }

    #[test]
    fn test_upsert_overwrites() {
        let mut store = RouterStore::absent();
        store.upsert(U256::one(), desc(1));
        store.upsert(U256::one(), desc(2));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&U256::one()), Some(&desc(2)));
    }

    #[test]
    fn test_remove_last_collapses_to_absent() {
        let mut store = RouterStore::absent();
        store.upsert(U256::from(5), desc(5));
        store.upsert(U256::from(6), desc(6));

        assert!(store.remove(&U256::from(5)));
        assert!(store.as_maybe().is_just());
        assert!(!store.remove(&U256::from(5)));

        assert!(store.remove(&U256::from(6)));
        assert!(store.is_absent());
    }

    #[test]
    fn test_remove_from_absent() {
        let mut store = RouterStore::absent();
        assert!(!store.remove(&U256::zero()));
        assert!(store.is_absent());
    }

    #[test]
    fn test_replace_all_with_empty_is_absent() {
        let mut store = RouterStore::absent();
        store.upsert(U256::from(9), desc(9));
        store.replace_all(RouterDict::new());
        assert!(store.is_absent());
    }

    #[test]
    fn test_replace_all_discards_previous() {
        let mut store = RouterStore::absent();
        store.upsert(U256::from(1), desc(1));
        store.replace_all([(U256::from(2), desc(2))].into_iter().collect());
        assert_eq!(store.get(&U256::from(1)), None);
        assert_eq!(store.get(&U256::from(2)), Some(&desc(2)));
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let mut store = RouterStore::absent();
        for key in [30u64, 10, 20] {
            store.upsert(U256::from(key), desc(key));
        }
        let keys: Vec<U256> = store.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![U256::from(10), U256::from(20), U256::from(30)]);
    }

    #[test]
    fn test_from_maybe_normalises_empty() {
        assert!(RouterStore::from_maybe(Maybe::Just(RouterDict::new())).is_absent());
    }
}
