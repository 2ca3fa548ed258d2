//! # Partition Indexes
//!
//! BTreeMap-backed indexes kept in lockstep with a partition's primary map.
//!
//! - `UniqueIndex`: value -> at most one id
//! - `SearchIndex`: value -> set of ids
//! - `PartitionIndexes`: one index per declared key
//!
//! Indexes are derived state. They are updated in the same write-locked
//! operation as the primary map, so a reader never sees one without the other.
//! Documents missing an attribute are simply absent from that attribute's index.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::document::{field_value, Document, PartitionSettings};
use super::keys::{PartitionKey, UID_PARTITION_KEY};
use super::uid::Uid;
use super::value::FieldValue;

/// Index over a unique attribute
#[derive(Debug, Default)]
pub struct UniqueIndex {
    tree: BTreeMap<FieldValue, Uid>,
}

impl UniqueIndex {
    pub fn new() -> Self {
        Self {
            tree: BTreeMap::new(),
        }
    }

    /// Insert a mapping, returning the id it displaced
    pub fn insert(&mut self, value: FieldValue, uid: Uid) -> Option<Uid> {
        self.tree.insert(value, uid)
    }

    /// Remove a mapping if it still points at `uid`
    pub fn remove(&mut self, value: &FieldValue, uid: &Uid) {
        if self.tree.get(value) == Some(uid) {
            self.tree.remove(value);
        }
    }

    pub fn lookup(&self, value: &FieldValue) -> Option<Uid> {
        self.tree.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

/// Index over a searchable attribute
#[derive(Debug, Default)]
pub struct SearchIndex {
    tree: BTreeMap<FieldValue, BTreeSet<Uid>>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self {
            tree: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, value: FieldValue, uid: Uid) {
        self.tree.entry(value).or_default().insert(uid);
    }

    /// Remove an id for a value.
    ///
    /// If the value has no more ids, removes the value entirely.
    pub fn remove(&mut self, value: &FieldValue, uid: &Uid) {
        if let Some(uids) = self.tree.get_mut(value) {
            uids.remove(uid);
            if uids.is_empty() {
                self.tree.remove(value);
            }
        }
    }

    pub fn lookup(&self, value: &FieldValue) -> BTreeSet<Uid> {
        self.tree.get(value).cloned().unwrap_or_default()
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

/// All indexes of one partition
#[derive(Debug, Default)]
pub struct PartitionIndexes {
    unique: HashMap<&'static str, UniqueIndex>,
    searchable: HashMap<&'static str, SearchIndex>,
}

impl PartitionIndexes {
    /// Empty indexes for every key declared in `settings`
    pub fn new(settings: &PartitionSettings) -> Self {
        let unique = settings
            .unique_keys()
            .iter()
            .map(|key| (key.name(), UniqueIndex::new()))
            .collect();
        let searchable = settings
            .searchable_keys()
            .iter()
            .map(|key| (key.name(), SearchIndex::new()))
            .collect();

        Self { unique, searchable }
    }

    /// Unique keys on which `doc` collides with a different stored document
    pub fn collisions<T: Document>(
        &self,
        settings: &PartitionSettings,
        doc: &T,
    ) -> Vec<(PartitionKey, Uid)> {
        let mut found = Vec::new();
        for key in settings.unique_keys() {
            let Some(value) = field_value(doc, key) else {
                continue;
            };
            let Some(index) = self.unique.get(key.name()) else {
                continue;
            };
            if let Some(existing) = index.lookup(&value) {
                if *key == UID_PARTITION_KEY || existing != doc.id() {
                    found.push((*key, existing));
                }
            }
        }
        found
    }

    /// Index a newly stored document
    pub fn apply_write<T: Document>(&mut self, settings: &PartitionSettings, doc: &T) {
        let uid = doc.id();

        for key in settings.unique_keys() {
            if let (Some(value), Some(index)) =
                (field_value(doc, key), self.unique.get_mut(key.name()))
            {
                index.insert(value, uid);
            }
        }

        for key in settings.searchable_keys() {
            if let (Some(value), Some(index)) =
                (field_value(doc, key), self.searchable.get_mut(key.name()))
            {
                index.insert(value, uid);
            }
        }
    }

    /// Remove a stored document from every index
    pub fn apply_delete<T: Document>(&mut self, settings: &PartitionSettings, doc: &T) {
        let uid = doc.id();

        for key in settings.unique_keys() {
            if let (Some(value), Some(index)) =
                (field_value(doc, key), self.unique.get_mut(key.name()))
            {
                index.remove(&value, &uid);
            }
        }

        for key in settings.searchable_keys() {
            if let (Some(value), Some(index)) =
                (field_value(doc, key), self.searchable.get_mut(key.name()))
            {
                index.remove(&value, &uid);
            }
        }
    }

    /// Exact lookup on a unique key
    pub fn lookup_unique(&self, key: &str, value: &FieldValue) -> Option<Uid> {
        self.unique.get(key).and_then(|index| index.lookup(value))
    }

    /// Exact lookup on a searchable key
    pub fn lookup_search(&self, key: &str, value: &FieldValue) -> BTreeSet<Uid> {
        self.searchable
            .get(key)
            .map(|index| index.lookup(value))
            .unwrap_or_default()
    }

    /// Number of entries in a unique index
    pub fn unique_len(&self, key: &str) -> usize {
        self.unique.get(key).map(UniqueIndex::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::value::FieldType;

    const NAME: PartitionKey = PartitionKey::new("name", FieldType::String);
    const TEAM: PartitionKey = PartitionKey::new("team", FieldType::String);

    #[derive(Debug, Clone)]
    struct Member {
        id: Uid,
        name: String,
        team: Option<String>,
    }

    impl Document for Member {
        const KIND: &'static str = "Member";

        fn id(&self) -> Uid {
            self.id
        }

        fn unique_keys() -> &'static [PartitionKey] {
            &[NAME]
        }

        fn searchable_keys() -> &'static [PartitionKey] {
            &[TEAM]
        }

        fn field(&self, name: &str) -> Option<FieldValue> {
            match name {
                "name" => Some(self.name.clone().into()),
                "team" => self.team.clone().map(FieldValue::from),
                _ => None,
            }
        }
    }

    fn member(name: &str, team: Option<&str>) -> Member {
        Member {
            id: Uid::new(),
            name: name.to_string(),
            team: team.map(str::to_string),
        }
    }

    #[test]
    fn test_unique_remove_only_matching_id() {
        let mut index = UniqueIndex::new();
        let a = Uid::new();
        index.insert(FieldValue::from("x"), a);
        index.remove(&FieldValue::from("x"), &Uid::new());
        assert_eq!(index.lookup(&FieldValue::from("x")), Some(a));
        index.remove(&FieldValue::from("x"), &a);
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_remove_drops_empty_values() {
        let mut index = SearchIndex::new();
        let a = Uid::new();
        index.insert(FieldValue::from("blue"), a);
        index.remove(&FieldValue::from("blue"), &a);
        assert!(index.is_empty());
    }

    #[test]
    fn test_write_and_delete_round_trip() {
        let settings = PartitionSettings::for_document::<Member>("Member");
        let mut indexes = PartitionIndexes::new(&settings);
        let alice = member("alice", Some("blue"));

        indexes.apply_write(&settings, &alice);
        assert_eq!(indexes.lookup_unique("name", &"alice".into()), Some(alice.id));
        assert_eq!(indexes.lookup_unique("id", &alice.id.into()), Some(alice.id));
        assert!(indexes.lookup_search("team", &"blue".into()).contains(&alice.id));

        indexes.apply_delete(&settings, &alice);
        assert_eq!(indexes.lookup_unique("name", &"alice".into()), None);
        assert_eq!(indexes.unique_len("id"), 0);
        assert!(indexes.lookup_search("team", &"blue".into()).is_empty());
    }

    #[test]
    fn test_missing_attribute_not_indexed() {
        let settings = PartitionSettings::for_document::<Member>("Member");
        let mut indexes = PartitionIndexes::new(&settings);
        let loner = member("bob", None);

        indexes.apply_write(&settings, &loner);
        assert_eq!(indexes.unique_len("name"), 1);
        assert!(indexes.searchable.get("team").is_some_and(SearchIndex::is_empty));
    }

    #[test]
    fn test_collisions_report_key() {
        let settings = PartitionSettings::for_document::<Member>("Member");
        let mut indexes = PartitionIndexes::new(&settings);
        let first = member("carol", None);
        indexes.apply_write(&settings, &first);

        let clash = member("carol", Some("red"));
        let collisions = indexes.collisions(&settings, &clash);
        assert_eq!(collisions, vec![(NAME, first.id)]);

        assert!(indexes.collisions(&settings, &member("dave", None)).is_empty());
    }
}
