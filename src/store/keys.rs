//! # Partition Keys
//!
//! Point-lookup predicates over declared attributes.
//!
//! - `PartitionKey`: an attribute name plus its declared type
//! - `QueryKey`: a partition key bound to a value
//! - `QueryKeys`: an ordered AND of query keys
//!
//! There is no OR, negation or range predicate.

use std::fmt;

use super::uid::Uid;
use super::value::{FieldType, FieldValue};

/// Named, typed attribute usable in a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartitionKey {
    name: &'static str,
    field_type: FieldType,
}

/// Implicit unique key present on every partition
pub const UID_PARTITION_KEY: PartitionKey = PartitionKey::new("id", FieldType::Uid);

impl PartitionKey {
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self { name, field_type }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Bind this key to a value
    pub fn with_obj(&self, value: impl Into<FieldValue>) -> QueryKey {
        QueryKey {
            key: *self,
            value: value.into(),
        }
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.field_type)
    }
}

/// A partition key bound to an expected value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    key: PartitionKey,
    value: FieldValue,
}

impl QueryKey {
    pub fn key(&self) -> &PartitionKey {
        &self.key
    }

    pub fn name(&self) -> &'static str {
        self.key.name
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueryKey(key={}, value={})", self.key.name, self.value)
    }
}

/// Ordered collection of query keys combined with AND
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QueryKeys {
    qks: Vec<QueryKey>,
}

impl QueryKeys {
    pub fn new(qks: Vec<QueryKey>) -> Self {
        Self { qks }
    }

    /// No constraint
    pub fn empty() -> Self {
        Self::default()
    }

    /// Single-key query
    pub fn from_obj(key: &PartitionKey, value: impl Into<FieldValue>) -> Self {
        Self::new(vec![key.with_obj(value)])
    }

    /// Query on the primary id
    pub fn from_uid(uid: Uid) -> Self {
        Self::from_obj(&UID_PARTITION_KEY, uid)
    }

    pub fn all(&self) -> &[QueryKey] {
        &self.qks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QueryKey> {
        self.qks.iter()
    }

    pub fn len(&self) -> usize {
        self.qks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.qks.is_empty()
    }
}

impl From<QueryKey> for QueryKeys {
    fn from(qk: QueryKey) -> Self {
        Self::new(vec![qk])
    }
}

impl FromIterator<QueryKey> for QueryKeys {
    fn from_iter<I: IntoIterator<Item = QueryKey>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a QueryKeys {
    type Item = &'a QueryKey;
    type IntoIter = std::slice::Iter<'a, QueryKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.qks.iter()
    }
}
