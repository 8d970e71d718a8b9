//! Sync bookkeeping shared by every synchronizable entity.
//!
//! Each entity owns a [`SyncState`] value and exposes it through the
//! [`Synchronizable`] trait. Entity fields are never publicly writable:
//! every public mutator is routed through [`Synchronizable::edit`], which
//! applies the change and then calls [`SyncState::mark_dirty`].
//!
//! Clearing the dirty flag is reserved to the ingestion processors, so
//! `mark_synced` is crate-private.

use serde::{Deserialize, Serialize};

use crate::model::EntityKind;

/// Current wall-clock time in Unix milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Owner, modification time and dirty flag for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    owner: Option<String>,
    last_modified: i64,
    dirty: bool,
}

impl SyncState {
    /// State for an entity created by a local user action (dirty).
    #[must_use]
    pub fn local(owner: Option<String>) -> Self {
        Self {
            owner,
            last_modified: now_millis(),
            dirty: true,
        }
    }

    /// State for an entity first materialized by ingestion (clean).
    ///
    /// The owner is resolved afterwards by the processor.
    #[must_use]
    pub(crate) fn remote() -> Self {
        Self {
            owner: None,
            last_modified: now_millis(),
            dirty: false,
        }
    }

    /// Id of the owning user, if resolved.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Unix milliseconds of the most recent local mutation.
    #[must_use]
    pub fn last_modified(&self) -> i64 {
        self.last_modified
    }

    /// True when the entity has local changes not yet pushed outward.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Records a local mutation.
    pub fn mark_dirty(&mut self) {
        // Never move backwards if the clock stepped.
        self.last_modified = now_millis().max(self.last_modified);
        self.dirty = true;
    }

    /// Clears the dirty flag after a remote record has been fully applied.
    pub(crate) fn mark_synced(&mut self) {
        self.dirty = false;
    }

    /// Replaces the owner without touching the dirty flag (ingestion path).
    pub(crate) fn assign_owner(&mut self, owner: Option<String>) {
        self.owner = owner;
    }
}

/// Capability implemented by every entity carrying a [`SyncState`].
pub trait Synchronizable {
    /// Kind tag used for storage rows and reports.
    const KIND: EntityKind;

    /// Stable, globally-unique id.
    fn id(&self) -> &str;

    fn sync_state(&self) -> &SyncState;

    fn sync_state_mut(&mut self) -> &mut SyncState;

    fn owner_id(&self) -> Option<&str> {
        self.sync_state().owner()
    }

    fn is_dirty(&self) -> bool {
        self.sync_state().is_dirty()
    }

    fn last_modified(&self) -> i64 {
        self.sync_state().last_modified()
    }

    fn mark_dirty(&mut self) {
        self.sync_state_mut().mark_dirty();
    }

    /// Applies a local change and marks the entity dirty.
    ///
    /// All public setters on entity types go through here.
    fn edit<F>(&mut self, change: F)
    where
        Self: Sized,
        F: FnOnce(&mut Self),
    {
        change(self);
        self.mark_dirty();
    }

    /// Reassigns the owning user as a local action.
    fn set_owner(&mut self, owner: Option<String>)
    where
        Self: Sized,
    {
        self.edit(|entity| entity.sync_state_mut().assign_owner(owner));
    }
}

/// Generates a fresh entity id.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
