//! Hearth - entity sync and space sharing for a household planner
//!
//! This crate provides the sync core behind the `hearth` CLI: a local
//! object graph of users, recipes, meals, shopping list items and todo
//! items, kept in step with a remote source, plus derived space sharing.
//!
//! # Architecture
//!
//! - [`model`] - Entity types and the sync-state capability
//! - [`storage`] - Entity store over SQLite / in-memory backends
//! - [`sync`] - Record codec, per-kind processors, coordinator, export
//! - [`sharing`] - Space relationship recomputation
//! - [`config`] - Path and user resolution
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod sharing;
pub mod storage;
pub mod sync;

pub use error::{Error, Result};

/// Global silent mode flag for `--silent` output.
///
/// When set, mutating commands print only the affected ID instead of full
/// output.
pub static SILENT: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

/// Check if silent mode is active.
#[inline]
pub fn is_silent() -> bool {
    SILENT.load(std::sync::atomic::Ordering::Relaxed)
}
