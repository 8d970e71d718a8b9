//! Local store for Hearth.
//!
//! This module provides the persistence layer:
//! - An in-memory arena of entities indexed by id ([`EntityStore`])
//! - Content-hash change detection so saves only write what changed
//! - Pluggable backends: SQLite (WAL mode, one transaction per save) and
//!   a volatile in-memory backend
//!
//! # Submodules
//!
//! - [`backend`] - Backend contract and the in-memory backend
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - SQLite backend
//! - [`store`] - The entity store

pub mod backend;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use backend::{Backend, MemoryBackend, PersistedRow};
pub use sqlite::SqliteBackend;
pub use store::{EntityStore, KindStatus, SaveStats, Stored};
