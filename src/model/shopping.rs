//! Shopping list item model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{new_id, EntityKind, SyncState, Synchronizable};

/// An entry on the shopping list, optionally tied to the meals needing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub(crate) id: String,
    pub(crate) sync: SyncState,
    pub(crate) name: String,
    pub(crate) quantity: Option<String>,
    pub(crate) is_purchased: bool,
    /// Owned companion task.
    pub(crate) todo_item_id: Option<String>,
    pub(crate) meal_ids: Vec<String>,
    pub(crate) space_ids: BTreeSet<String>,
}

impl_synchronizable!(ShoppingListItem, EntityKind::ShoppingListItem);

impl ShoppingListItem {
    #[must_use]
    pub fn new(owner_id: &str, name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            sync: SyncState::local(Some(owner_id.to_string())),
            name: name.into(),
            quantity: None,
            is_purchased: false,
            todo_item_id: None,
            meal_ids: Vec::new(),
            space_ids: BTreeSet::new(),
        }
    }

    pub(crate) fn from_remote(id: &str, name: String) -> Self {
        Self {
            id: id.to_string(),
            sync: SyncState::remote(),
            name,
            quantity: None,
            is_purchased: false,
            todo_item_id: None,
            meal_ids: Vec::new(),
            space_ids: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn quantity(&self) -> Option<&str> {
        self.quantity.as_deref()
    }

    #[must_use]
    pub fn is_purchased(&self) -> bool {
        self.is_purchased
    }

    #[must_use]
    pub fn todo_item_id(&self) -> Option<&str> {
        self.todo_item_id.as_deref()
    }

    #[must_use]
    pub fn meal_ids(&self) -> &[String] {
        &self.meal_ids
    }

    #[must_use]
    pub fn space_ids(&self) -> &BTreeSet<String> {
        &self.space_ids
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.edit(|item| item.name = name);
    }

    pub fn set_quantity(&mut self, quantity: Option<String>) {
        self.edit(|item| item.quantity = quantity);
    }

    pub fn set_purchased(&mut self, purchased: bool) {
        self.edit(|item| item.is_purchased = purchased);
    }

    pub fn set_todo_item(&mut self, todo_item_id: Option<String>) {
        self.edit(|item| item.todo_item_id = todo_item_id);
    }

    pub fn add_meal(&mut self, meal_id: &str) {
        self.edit(|item| {
            if !item.meal_ids.iter().any(|id| id == meal_id) {
                item.meal_ids.push(meal_id.to_string());
            }
        });
    }

    pub fn remove_meal(&mut self, meal_id: &str) {
        self.edit(|item| item.meal_ids.retain(|id| id != meal_id));
    }

    pub(crate) fn replace_space_ids(&mut self, space_ids: BTreeSet<String>) {
        self.edit(|item| item.space_ids = space_ids);
    }
}
