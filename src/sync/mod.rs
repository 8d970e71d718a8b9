//! Sync engine.
//!
//! - **Records**: typed boundary records per kind, decoded on ingestion and
//!   encoded on egress
//! - **Processors**: apply one kind's batch to the store
//! - **Coordinator**: runs the processors in dependency order and saves
//! - **Export**: writes dirty entities to an outbox payload
//! - **Hashing**: SHA256 content hashing for change detection
//!
//! # Payload format
//!
//! Ingestion and egress share one shape, a JSON object keyed by kind:
//! ```json
//! {"users":[{"uid":"u1"}],"meals":[{"uid":"m1","scalingFactor":1.0,"mealType":"dinner","ownerId":"u1"}]}
//! ```
//!
//! # Example
//!
//! ```ignore
//! use hearth::sync::{Coordinator, IngestionPayload};
//!
//! let payload = IngestionPayload::from_json_str(&json)?;
//! let report = Coordinator::new(&mut store).run(payload)?;
//! ```

mod coordinator;
mod export;
mod file;
mod hash;
pub mod processor;
pub mod records;
mod status;
mod types;

pub use coordinator::{Coordinator, IngestionPayload, INGESTION_ORDER};
pub use export::{EgressPayload, Exporter};
pub use file::{atomic_write, file_size, read_payload};
pub use hash::{has_changed, hash_str};
pub use processor::{Applied, Processor};
pub use status::{get_sync_status, print_status, SyncStatus};
pub use types::{
    EntityStats, ExportStats, IngestionReport, ProcessingReport, RecordIssue, SyncError,
    SyncResult,
};
