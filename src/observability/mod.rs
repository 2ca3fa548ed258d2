//! Observability for stashdb
//!
//! - Structured logging through `tracing`
//! - Typed lifecycle events
//! - Per-partition counters
//!
//! Observability is read-only: nothing here changes the outcome of a store
//! operation.
//!
//! # Usage
//!
//! ```ignore
//! use stashdb::observability::{init_logging, log_event, Event};
//!
//! init_logging();
//! log_event(Event::PartitionQuery, "Request", "3 matches");
//! ```

mod events;
mod metrics;

pub use events::Event;
pub use metrics::{MetricsRegistry, MetricsSnapshot};

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive
pub const LOG_ENV_VAR: &str = "STASHDB_LOG";

/// Install the global `fmt` subscriber.
///
/// Reads the filter from `STASHDB_LOG`, defaulting to `info`. Logs go to
/// stderr so stdout stays clean for command output. Calling this twice is
/// harmless; the second install is ignored.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log a store event against a partition.
///
/// Failures log at WARN, everything else at DEBUG.
pub fn log_event(event: Event, partition: &str, detail: &str) {
    if event.is_failure() {
        tracing::warn!(event = event.as_str(), partition, "{}", detail);
    } else {
        tracing::debug!(event = event.as_str(), partition, "{}", detail);
    }
}
