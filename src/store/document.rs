//! Document schema declarations
//!
//! A document kind declares which attributes are unique (at most one
//! document per value) and which are searchable (any number of documents
//! per value). The primary id is always unique.

use super::keys::{PartitionKey, UID_PARTITION_KEY};
use super::uid::Uid;
use super::value::FieldValue;

/// An entity kind that can live in a partition
pub trait Document: Clone + Send + Sync + 'static {
    /// Entity kind name
    const KIND: &'static str;

    /// Primary id
    fn id(&self) -> Uid;

    /// Unique attributes besides the primary id
    fn unique_keys() -> &'static [PartitionKey] {
        &[]
    }

    /// Searchable attributes
    fn searchable_keys() -> &'static [PartitionKey] {
        &[]
    }

    /// Value of a declared attribute, `None` when unset
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Value of `key` on `doc`, resolving the primary id key itself
pub fn field_value<T: Document>(doc: &T, key: &PartitionKey) -> Option<FieldValue> {
    if key.name() == UID_PARTITION_KEY.name() {
        return Some(FieldValue::Uid(doc.id()));
    }
    doc.field(key.name())
}

/// Name and schema of one partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSettings {
    name: String,
    object_kind: &'static str,
    unique_keys: Vec<PartitionKey>,
    searchable_keys: Vec<PartitionKey>,
}

impl PartitionSettings {
    /// Settings for a partition holding documents of kind `T`
    pub fn for_document<T: Document>(name: impl Into<String>) -> Self {
        let mut unique_keys = vec![UID_PARTITION_KEY];
        unique_keys.extend(T::unique_keys().iter().copied());

        Self {
            name: name.into(),
            object_kind: T::KIND,
            unique_keys,
            searchable_keys: T::searchable_keys().to_vec(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_kind(&self) -> &'static str {
        self.object_kind
    }

    /// Unique keys, primary id first
    pub fn unique_keys(&self) -> &[PartitionKey] {
        &self.unique_keys
    }

    pub fn searchable_keys(&self) -> &[PartitionKey] {
        &self.searchable_keys
    }

    /// Declared unique key with this name
    pub fn unique_key(&self, name: &str) -> Option<&PartitionKey> {
        self.unique_keys.iter().find(|k| k.name() == name)
    }

    /// Declared searchable key with this name
    pub fn searchable_key(&self, name: &str) -> Option<&PartitionKey> {
        self.searchable_keys.iter().find(|k| k.name() == name)
    }
}
