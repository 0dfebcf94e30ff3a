//! Reference implementations of the mise-core collaborator traits.
//!
//! The in-memory store backs the CLI and the test suite; a production
//! deployment would swap in a database-backed implementation of the same
//! traits.

pub mod memory;
pub mod publisher;
pub mod snapshot;

pub use memory::MemoryStore;
pub use publisher::{RecordingPublisher, TracingPublisher};
pub use snapshot::{Snapshot, SnapshotError};
