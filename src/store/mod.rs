//! # Document Store
//!
//! Credentialed, partition-indexed document storage.
//!
//! A partition holds documents of one kind. Each declared unique key gets a
//! one-to-one index and each searchable key a one-to-many index. Queries
//! are AND-ed lists of exact-match `QueryKey`s resolved against those
//! indexes; there are no range, OR or negation predicates.
//!
//! Every operation takes the acting `VerifyKey` explicitly and returns a
//! `StoreResult`. The partition's root key passes every access check.
//!
//! # Usage
//!
//! ```ignore
//! use stashdb::store::{AccessPolicy, DocumentStorePartition, InMemoryPartition, QueryKeys};
//!
//! let partition = InMemoryPartition::<Request>::for_document(AccessPolicy::new(root));
//! partition.register(&root, request)?;
//! let pending = partition.query_all(&root, &QueryKeys::from_obj(&STATUS_PARTITION_KEY, "pending"))?;
//! ```

mod access;
mod blob;
mod document;
mod errors;
mod index;
mod keys;
mod kv;
mod partition;
mod proxy;
mod uid;
mod value;

pub use access::{Access, AccessPolicy};
pub use blob::{BlobError, BlobResult, BlobStore, InMemoryBlobStore, PresignedUrl};
pub use document::{field_value, Document, PartitionSettings};
pub use errors::{StoreError, StoreErrorKind, StoreResult};
pub use index::{PartitionIndexes, SearchIndex, UniqueIndex};
pub use keys::{PartitionKey, QueryKey, QueryKeys, UID_PARTITION_KEY};
pub use kv::{InMemoryKeyValueStore, KeyValueStore, PartitionKvStore};
pub use partition::{split_query_keys, DocumentStorePartition, InMemoryPartition};
pub use proxy::ProxyDataset;
pub use uid::Uid;
pub use value::{FieldType, FieldValue};
