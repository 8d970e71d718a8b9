//! User model.

use serde::{Deserialize, Serialize};

use crate::model::{new_id, EntityKind, SyncState, Synchronizable};

/// A person using Hearth. Users own every content entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub(crate) id: String,
    pub(crate) sync: SyncState,
    pub(crate) name: Option<String>,
    /// Non-owning references to other users.
    pub(crate) friend_ids: Vec<String>,
}

impl_synchronizable!(User, EntityKind::User);

impl User {
    /// Creates a user from a local action. A user owns itself.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let id = new_id();
        Self {
            sync: SyncState::local(Some(id.clone())),
            id,
            name: Some(name.into()),
            friend_ids: Vec::new(),
        }
    }

    pub(crate) fn from_remote(id: &str) -> Self {
        let mut sync = SyncState::remote();
        sync.assign_owner(Some(id.to_string()));
        Self {
            id: id.to_string(),
            sync,
            name: None,
            friend_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn friend_ids(&self) -> &[String] {
        &self.friend_ids
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.edit(|user| user.name = Some(name));
    }

    /// Adds a friend reference, keeping the list free of duplicates.
    pub fn add_friend(&mut self, friend_id: &str) {
        self.edit(|user| {
            if !user.friend_ids.iter().any(|id| id == friend_id) {
                user.friend_ids.push(friend_id.to_string());
            }
        });
    }

    pub fn remove_friend(&mut self, friend_id: &str) {
        self.edit(|user| user.friend_ids.retain(|id| id != friend_id));
    }
}
