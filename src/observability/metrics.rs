//! Per-partition operation counters
//!
//! - Counters only increase, except the live document count
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

/// Operation counters for one partition
///
/// Uses Relaxed ordering; counters are observational and never drive behavior.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    registers: AtomicU64,
    deletes: AtomicU64,
    replaces: AtomicU64,
    queries: AtomicU64,
    permission_denials: AtomicU64,
    query_errors: AtomicU64,
    duplicate_keys: AtomicU64,
    documents: AtomicU64,
}

impl MetricsRegistry {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_registers(&self) {
        self.registers.fetch_add(1, Ordering::Relaxed);
        self.documents.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_deletes(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        // Never wraps below zero
        let _ = self
            .documents
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(n.saturating_sub(1)));
    }

    pub fn increment_replaces(&self) {
        self.replaces.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_permission_denials(&self) {
        self.permission_denials.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_query_errors(&self) {
        self.query_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_duplicate_keys(&self) {
        self.duplicate_keys.fetch_add(1, Ordering::Relaxed);
    }

    /// Current live document count
    pub fn documents(&self) -> u64 {
        self.documents.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            registers: self.registers.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            replaces: self.replaces.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
            permission_denials: self.permission_denials.load(Ordering::Relaxed),
            query_errors: self.query_errors.load(Ordering::Relaxed),
            duplicate_keys: self.duplicate_keys.load(Ordering::Relaxed),
            documents: self.documents.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of partition counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub registers: u64,
    pub deletes: u64,
    pub replaces: u64,
    pub queries: u64,
    pub permission_denials: u64,
    pub query_errors: u64,
    pub duplicate_keys: u64,
    pub documents: u64,
}
