//! Append-only event log for the Wayfarer world-state engine.
//!
//! Every fact about the world (generated zones, personas, dialog lines,
//! portals, visit traces) is an immutable [`Event`](wayfarer_types::Event)
//! appended here. The log is the source of truth: zone state is recovered
//! by querying it, never by keeping a second copy.
//!
//! # Modules
//!
//! - [`log`] -- [`EventLog`] with append, tag queries, and append observers.
//! - [`store`] -- The [`BlobStore`] trait with in-memory and file-backed
//!   implementations.
//! - [`error`] -- Error types for appends and blob writes.

pub mod error;
pub mod log;
pub mod store;

// Re-export primary types at crate root.
pub use error::{EventLogError, StoreError};
pub use log::{AppendObserver, DEFAULT_LOG_KEY, EventLog};
pub use store::{BlobStore, FileBlobStore, MemoryBlobStore};
