//! Space model: a sharing scope with members and auto-share policy.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{new_id, EntityKind, SyncState, Synchronizable};

/// A sharing scope.
///
/// Content owned by a member becomes visible in the space when the matching
/// policy flag is on (or, for todo items, when their category is shared).
/// Visibility itself is derived by [`crate::sharing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub(crate) id: String,
    pub(crate) sync: SyncState,
    pub(crate) name: String,
    pub(crate) member_ids: BTreeSet<String>,
    pub(crate) shared_category_ids: BTreeSet<String>,
    pub(crate) share_all_recipes: bool,
    pub(crate) share_all_meals: bool,
    pub(crate) share_all_shopping_items: bool,
}

impl_synchronizable!(Space, EntityKind::Space);

/// Which content kind a policy flag governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharePolicy {
    Recipes,
    Meals,
    ShoppingItems,
}

impl Space {
    /// Creates a space whose creator is its owner and first member.
    #[must_use]
    pub fn new(owner_id: &str, name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            sync: SyncState::local(Some(owner_id.to_string())),
            name: name.into(),
            member_ids: BTreeSet::from([owner_id.to_string()]),
            shared_category_ids: BTreeSet::new(),
            share_all_recipes: false,
            share_all_meals: false,
            share_all_shopping_items: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn member_ids(&self) -> &BTreeSet<String> {
        &self.member_ids
    }

    #[must_use]
    pub fn has_member(&self, user_id: &str) -> bool {
        self.member_ids.contains(user_id)
    }

    #[must_use]
    pub fn shared_category_ids(&self) -> &BTreeSet<String> {
        &self.shared_category_ids
    }

    #[must_use]
    pub fn share_all_recipes(&self) -> bool {
        self.share_all_recipes
    }

    #[must_use]
    pub fn share_all_meals(&self) -> bool {
        self.share_all_meals
    }

    #[must_use]
    pub fn share_all_shopping_items(&self) -> bool {
        self.share_all_shopping_items
    }

    #[must_use]
    pub fn policy(&self, policy: SharePolicy) -> bool {
        match policy {
            SharePolicy::Recipes => self.share_all_recipes,
            SharePolicy::Meals => self.share_all_meals,
            SharePolicy::ShoppingItems => self.share_all_shopping_items,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.edit(|space| space.name = name);
    }

    pub fn add_member(&mut self, user_id: &str) {
        self.edit(|space| {
            space.member_ids.insert(user_id.to_string());
        });
    }

    pub fn remove_member(&mut self, user_id: &str) {
        self.edit(|space| {
            space.member_ids.remove(user_id);
        });
    }

    pub fn share_category(&mut self, category_id: &str) {
        self.edit(|space| {
            space.shared_category_ids.insert(category_id.to_string());
        });
    }

    pub fn unshare_category(&mut self, category_id: &str) {
        self.edit(|space| {
            space.shared_category_ids.remove(category_id);
        });
    }

    pub fn set_policy(&mut self, policy: SharePolicy, enabled: bool) {
        self.edit(|space| match policy {
            SharePolicy::Recipes => space.share_all_recipes = enabled,
            SharePolicy::Meals => space.share_all_meals = enabled,
            SharePolicy::ShoppingItems => space.share_all_shopping_items = enabled,
        });
    }
}
