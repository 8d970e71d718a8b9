//! Todo item, category and event models.
//!
//! # Ownership
//!
//! - A todo item owns its events: deleting the item deletes them.
//! - Categories are shared by name and never owned by an item.
//! - Events carry their own [`SyncState`] because space changes on the
//!   parent item are cascaded to them and marked dirty individually.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{new_id, now_millis, EntityKind, SyncState, Synchronizable};

/// Named grouping for todo items. Names are unique within the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItemCategory {
    pub(crate) id: String,
    pub(crate) name: String,
}

impl TodoItemCategory {
    /// Creates a category; the caller is responsible for trimming the name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub(crate) id: String,
    pub(crate) sync: SyncState,
    pub(crate) title: String,
    pub(crate) details: String,
    /// Due date, Unix milliseconds.
    pub(crate) due_date: Option<i64>,
    pub(crate) is_completed: bool,
    pub(crate) category_id: Option<String>,
    /// Set when this task is the companion of a meal.
    pub(crate) meal_id: Option<String>,
    /// Set when this task is the companion of a shopping list item.
    pub(crate) shopping_list_item_id: Option<String>,
    pub(crate) event_ids: Vec<String>,
    pub(crate) space_ids: BTreeSet<String>,
}

impl_synchronizable!(TodoItem, EntityKind::TodoItem);

impl TodoItem {
    #[must_use]
    pub fn new(owner_id: &str, title: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            sync: SyncState::local(Some(owner_id.to_string())),
            title: title.into(),
            details: details.into(),
            due_date: None,
            is_completed: false,
            category_id: None,
            meal_id: None,
            shopping_list_item_id: None,
            event_ids: Vec::new(),
            space_ids: BTreeSet::new(),
        }
    }

    pub(crate) fn from_remote(id: &str, title: String, details: String) -> Self {
        Self {
            id: id.to_string(),
            sync: SyncState::remote(),
            title,
            details,
            due_date: None,
            is_completed: false,
            category_id: None,
            meal_id: None,
            shopping_list_item_id: None,
            event_ids: Vec::new(),
            space_ids: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn details(&self) -> &str {
        &self.details
    }

    #[must_use]
    pub fn due_date(&self) -> Option<i64> {
        self.due_date
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[must_use]
    pub fn category_id(&self) -> Option<&str> {
        self.category_id.as_deref()
    }

    #[must_use]
    pub fn meal_id(&self) -> Option<&str> {
        self.meal_id.as_deref()
    }

    #[must_use]
    pub fn shopping_list_item_id(&self) -> Option<&str> {
        self.shopping_list_item_id.as_deref()
    }

    #[must_use]
    pub fn event_ids(&self) -> &[String] {
        &self.event_ids
    }

    #[must_use]
    pub fn space_ids(&self) -> &BTreeSet<String> {
        &self.space_ids
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.edit(|item| item.title = title);
    }

    pub fn set_details(&mut self, details: impl Into<String>) {
        let details = details.into();
        self.edit(|item| item.details = details);
    }

    pub fn set_due_date(&mut self, due_date: Option<i64>) {
        self.edit(|item| item.due_date = due_date);
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.edit(|item| item.is_completed = completed);
    }

    /// Points the item at a category id (see `EntityStore::fetch_or_create_category`).
    pub fn set_category(&mut self, category_id: Option<String>) {
        self.edit(|item| item.category_id = category_id);
    }

    pub fn add_event(&mut self, event_id: &str) {
        self.edit(|item| {
            if !item.event_ids.iter().any(|id| id == event_id) {
                item.event_ids.push(event_id.to_string());
            }
        });
    }

    pub(crate) fn replace_space_ids(&mut self, space_ids: BTreeSet<String>) {
        self.edit(|item| item.space_ids = space_ids);
    }
}

/// A dated entry in a todo item's history (reminder fired, completed, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItemEvent {
    pub(crate) id: String,
    pub(crate) sync: SyncState,
    pub(crate) todo_item_id: String,
    pub(crate) summary: String,
    /// Unix milliseconds.
    pub(crate) occurred_at: i64,
    pub(crate) space_ids: BTreeSet<String>,
}

impl_synchronizable!(TodoItemEvent, EntityKind::TodoItemEvent);

impl TodoItemEvent {
    /// Creates an event for `item`, inheriting its owner and spaces.
    #[must_use]
    pub fn new(item: &TodoItem, summary: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            sync: SyncState::local(item.owner_id().map(str::to_string)),
            todo_item_id: item.id.clone(),
            summary: summary.into(),
            occurred_at: now_millis(),
            space_ids: item.space_ids.clone(),
        }
    }

    #[must_use]
    pub fn todo_item_id(&self) -> &str {
        &self.todo_item_id
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    #[must_use]
    pub fn occurred_at(&self) -> i64 {
        self.occurred_at
    }

    #[must_use]
    pub fn space_ids(&self) -> &BTreeSet<String> {
        &self.space_ids
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        let summary = summary.into();
        self.edit(|event| event.summary = summary);
    }

    pub(crate) fn replace_space_ids(&mut self, space_ids: BTreeSet<String>) {
        self.edit(|event| event.space_ids = space_ids);
    }
}
