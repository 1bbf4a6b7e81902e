//! Per-entity view state shared by the dashboards

use pheroclass_classroom::ClassroomError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Read models keyed by a strong identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMap<K: Ord, V> {
    entries: BTreeMap<K, V>,
}

impl<K: Ord, V> Default for EntityMap<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V> EntityMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the value stored for `key`, returning the previous one
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }
}

impl<K: Ord, V: Default> EntityMap<K, V> {
    /// The stored value, inserting a default one first if needed
    pub fn get_or_default(&mut self, key: K) -> &mut V {
        self.entries.entry(key).or_default()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for EntityMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K: Ord, V> Extend<(K, V)> for EntityMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

/// Actions currently in flight, one flag per entity
///
/// A flag is set before the write starts and cleared once it has finished,
/// whatever the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusySet<K: Ord> {
    active: BTreeSet<K>,
}

impl<K: Ord> Default for BusySet<K> {
    fn default() -> Self {
        Self {
            active: BTreeSet::new(),
        }
    }
}

impl<K: Ord> BusySet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` busy; false if it already was
    pub fn begin(&mut self, key: K) -> bool {
        self.active.insert(key)
    }

    pub fn finish(&mut self, key: &K) {
        self.active.remove(key);
    }

    pub fn is_busy(&self, key: &K) -> bool {
        self.active.contains(key)
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// The single message shown to the user after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    /// Error status for a failed action
    ///
    /// Wallet problems and reverts carry a message worth showing; anything
    /// else gets the action's generic `fallback` text.
    pub fn from_error(fallback: &str, error: &ClassroomError) -> Self {
        if error.is_wallet_error() || error.is_revert() {
            Self::error(error.user_message())
        } else {
            Self::error(fallback)
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pheroclass_classroom::{ContractAddress, LectureKey};

    fn class(n: u8) -> ContractAddress {
        ContractAddress::parse(&format!("0x{:040x}", n)).unwrap()
    }

    #[test]
    fn test_entity_map_keyed_by_lecture() {
        let mut map: EntityMap<LectureKey, Vec<String>> = EntityMap::new();
        let key = LectureKey::new(class(1), 1);
        map.get_or_default(key.clone()).push("alice".to_string());
        map.get_or_default(key.clone()).push("bob".to_string());
        map.insert(LectureKey::new(class(2), 1), vec![]);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&key).unwrap().len(), 2);
        assert!(!map.contains(&LectureKey::new(class(1), 2)));
        assert_eq!(map.remove(&key).unwrap(), vec!["alice", "bob"]);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_busy_set_flags_are_per_entity() {
        let mut busy = BusySet::new();
        assert!(busy.begin(LectureKey::new(class(1), 1)));
        assert!(!busy.begin(LectureKey::new(class(1), 1)));
        assert!(busy.begin(LectureKey::new(class(1), 2)));
        assert!(busy.is_busy(&LectureKey::new(class(1), 2)));

        busy.finish(&LectureKey::new(class(1), 1));
        busy.finish(&LectureKey::new(class(1), 2));
        assert!(busy.is_idle());
    }

    #[test]
    fn test_status_from_error() {
        let reverted = ClassroomError::reverted("mark attendance", "execution reverted: Already marked");
        let status = StatusMessage::from_error("Failed to mark attendance. Please try again.", &reverted);
        assert!(status.is_error());
        assert_eq!(status.text, "Error: Attendance already marked for this lecture");

        let network = ClassroomError::network("connection refused");
        let status = StatusMessage::from_error("Failed to mark attendance. Please try again.", &network);
        assert_eq!(status.text, "Failed to mark attendance. Please try again.");
    }
}
