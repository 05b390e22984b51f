//! In-memory application store for layerview.
//!
//! Holds the latest known record of every application, keyed by name.
//!
//! # Ownership
//!
//! The store is a plain value with `&mut self` mutators and no interior
//! locking. It is meant to be owned by exactly one task (the stream
//! controller), which applies a whole batch of changes and then publishes a
//! [`GroupedSnapshot`]. Readers only ever see snapshots, so they can never
//! observe a batch half-applied.

mod entity_store;
mod snapshot;

pub use entity_store::EntityStore;
pub use snapshot::GroupedSnapshot;
