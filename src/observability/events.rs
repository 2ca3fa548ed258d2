//! Observable store events
//!
//! Events are explicit and typed. Each one has a stable name used as the
//! `event` field of its log line.

use std::fmt;

/// Observable events in the document store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Writes
    /// Document registered into a partition
    PartitionRegister,
    /// Document deleted from a partition
    PartitionDelete,
    /// Colliding documents replaced by a new one
    PartitionReplace,

    // Reads
    /// Index/search key resolution completed
    PartitionQuery,

    // Failures
    /// Credential lacked access
    PermissionDenied,
    /// Query key rejected against the schema
    QueryRejected,
    /// Unique key collision on register
    DuplicateKey,

    // Lifecycle
    /// Configuration loaded
    ConfigLoaded,
    /// Partition seeded from a file
    PartitionSeeded,
}

impl Event {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::PartitionRegister => "PARTITION_REGISTER",
            Event::PartitionDelete => "PARTITION_DELETE",
            Event::PartitionReplace => "PARTITION_REPLACE",
            Event::PartitionQuery => "PARTITION_QUERY",
            Event::PermissionDenied => "PERMISSION_DENIED",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::DuplicateKey => "DUPLICATE_KEY",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::PartitionSeeded => "PARTITION_SEEDED",
        }
    }

    /// Whether this event reports a rejected operation
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::PermissionDenied | Event::QueryRejected | Event::DuplicateKey
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
