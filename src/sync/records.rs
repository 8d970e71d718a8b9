//! Typed boundary records, one per remotely synced kind.
//!
//! Ingestion decodes a field map into a record where every field is
//! optional, so "absent" and "present" stay distinguishable. Egress encodes
//! an entity into the same shape: references become ids, collections become
//! id arrays and unset references are left out. Content records also carry
//! the derived `spaceIds`, which only flows outward.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{
    Ingredient, Meal, Recipe, RecipeStep, ShoppingListItem, Synchronizable, TodoItem,
    TodoItemCategory, User,
};
use crate::storage::EntityStore;

/// Access to the id carried by every record.
pub trait Record {
    fn uid(&self) -> Option<&str>;
}

macro_rules! impl_record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Record for $ty {
                fn uid(&self) -> Option<&str> {
                    self.uid.as_deref().filter(|uid| !uid.trim().is_empty())
                }
            }
        )+
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub friend_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<Ingredient>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<RecipeStep>>,
    pub meal_ids: Vec<String>,
    /// Spaces the entity is visible in. Derived locally, so ingestion
    /// ignores it.
    pub space_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TodoItemRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopping_list_item_id: Option<String>,
    pub event_ids: Vec<String>,
    /// Spaces the entity is visible in. Derived locally, so ingestion
    /// ignores it.
    pub space_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MealRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling_factor: Option<f64>,
    /// Kept as text so an unknown value is a per-record issue, not a decode
    /// failure of the whole field map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo_item_id: Option<String>,
    pub shopping_list_item_ids: Vec<String>,
    /// Spaces the entity is visible in. Derived locally, so ingestion
    /// ignores it.
    pub space_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShoppingListItemRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_purchased: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo_item_id: Option<String>,
    pub meal_ids: Vec<String>,
    /// Spaces the entity is visible in. Derived locally, so ingestion
    /// ignores it.
    pub space_ids: Vec<String>,
}

impl_record!(
    UserRecord,
    RecipeRecord,
    TodoItemRecord,
    MealRecord,
    ShoppingListItemRecord,
);

/// Best-effort `uid` of a field map that failed to decode, for reporting.
#[must_use]
pub fn raw_uid(value: &Value) -> Option<String> {
    value
        .get("uid")
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

// ==================
// Egress encoding
// ==================

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            uid: Some(user.id().to_string()),
            name: user.name().map(ToString::to_string),
            friend_ids: user.friend_ids().to_vec(),
        }
    }
}

impl From<&Recipe> for RecipeRecord {
    fn from(recipe: &Recipe) -> Self {
        Self {
            uid: Some(recipe.id().to_string()),
            owner_id: recipe.owner_id().map(ToString::to_string),
            title: Some(recipe.title().to_string()),
            details: Some(recipe.details().to_string()),
            servings: recipe.servings(),
            ingredients: Some(recipe.ingredients().to_vec()),
            steps: Some(recipe.steps().to_vec()),
            meal_ids: recipe.meal_ids().to_vec(),
            space_ids: recipe.space_ids().iter().cloned().collect(),
        }
    }
}

impl TodoItemRecord {
    /// Encode a todo item; the category reference is sent by name.
    #[must_use]
    pub fn encode(item: &TodoItem, store: &EntityStore) -> Self {
        let category_name = item
            .category_id()
            .and_then(|id| store.fetch_unique::<TodoItemCategory>(id))
            .map(|category| category.name().to_string());
        Self {
            uid: Some(item.id().to_string()),
            owner_id: item.owner_id().map(ToString::to_string),
            title: Some(item.title().to_string()),
            details: Some(item.details().to_string()),
            due_date: item.due_date(),
            is_completed: Some(item.is_completed()),
            category_name,
            meal_id: item.meal_id().map(ToString::to_string),
            shopping_list_item_id: item.shopping_list_item_id().map(ToString::to_string),
            event_ids: item.event_ids().to_vec(),
            space_ids: item.space_ids().iter().cloned().collect(),
        }
    }
}

impl From<&Meal> for MealRecord {
    fn from(meal: &Meal) -> Self {
        Self {
            uid: Some(meal.id().to_string()),
            owner_id: meal.owner_id().map(ToString::to_string),
            scaling_factor: Some(meal.scaling_factor()),
            meal_type: Some(meal.meal_type().as_str().to_string()),
            date: meal.date(),
            recipe_id: meal.recipe_id().map(ToString::to_string),
            todo_item_id: meal.todo_item_id().map(ToString::to_string),
            shopping_list_item_ids: meal.shopping_list_item_ids().to_vec(),
            space_ids: meal.space_ids().iter().cloned().collect(),
        }
    }
}

impl From<&ShoppingListItem> for ShoppingListItemRecord {
    fn from(item: &ShoppingListItem) -> Self {
        Self {
            uid: Some(item.id().to_string()),
            owner_id: item.owner_id().map(ToString::to_string),
            name: Some(item.name().to_string()),
            quantity: item.quantity().map(ToString::to_string),
            is_purchased: Some(item.is_purchased()),
            todo_item_id: item.todo_item_id().map(ToString::to_string),
            meal_ids: item.meal_ids().to_vec(),
            space_ids: item.space_ids().iter().cloned().collect(),
        }
    }
}
