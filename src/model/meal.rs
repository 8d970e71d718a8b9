//! Meal model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{new_id, EntityKind, SyncState, Synchronizable};

/// Slot of the day a meal is planned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" => Ok(Self::Snack),
            _ => Err(format!("Unknown meal type: {s}")),
        }
    }
}

/// A planned meal.
///
/// The companion todo item is owned: deleting the meal deletes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub(crate) id: String,
    pub(crate) sync: SyncState,
    pub(crate) scaling_factor: f64,
    pub(crate) meal_type: MealType,
    /// Planned date, Unix milliseconds.
    pub(crate) date: Option<i64>,
    pub(crate) recipe_id: Option<String>,
    pub(crate) todo_item_id: Option<String>,
    pub(crate) shopping_list_item_ids: Vec<String>,
    pub(crate) space_ids: BTreeSet<String>,
}

impl_synchronizable!(Meal, EntityKind::Meal);

impl Meal {
    #[must_use]
    pub fn new(owner_id: &str, meal_type: MealType, scaling_factor: f64) -> Self {
        Self {
            id: new_id(),
            sync: SyncState::local(Some(owner_id.to_string())),
            scaling_factor,
            meal_type,
            date: None,
            recipe_id: None,
            todo_item_id: None,
            shopping_list_item_ids: Vec::new(),
            space_ids: BTreeSet::new(),
        }
    }

    pub(crate) fn from_remote(id: &str, meal_type: MealType, scaling_factor: f64) -> Self {
        Self {
            id: id.to_string(),
            sync: SyncState::remote(),
            scaling_factor,
            meal_type,
            date: None,
            recipe_id: None,
            todo_item_id: None,
            shopping_list_item_ids: Vec::new(),
            space_ids: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn scaling_factor(&self) -> f64 {
        self.scaling_factor
    }

    #[must_use]
    pub fn meal_type(&self) -> MealType {
        self.meal_type
    }

    #[must_use]
    pub fn date(&self) -> Option<i64> {
        self.date
    }

    #[must_use]
    pub fn recipe_id(&self) -> Option<&str> {
        self.recipe_id.as_deref()
    }

    #[must_use]
    pub fn todo_item_id(&self) -> Option<&str> {
        self.todo_item_id.as_deref()
    }

    #[must_use]
    pub fn shopping_list_item_ids(&self) -> &[String] {
        &self.shopping_list_item_ids
    }

    #[must_use]
    pub fn space_ids(&self) -> &BTreeSet<String> {
        &self.space_ids
    }

    pub fn set_scaling_factor(&mut self, scaling_factor: f64) {
        self.edit(|meal| meal.scaling_factor = scaling_factor);
    }

    pub fn set_meal_type(&mut self, meal_type: MealType) {
        self.edit(|meal| meal.meal_type = meal_type);
    }

    pub fn set_date(&mut self, date: Option<i64>) {
        self.edit(|meal| meal.date = date);
    }

    pub fn set_recipe(&mut self, recipe_id: Option<String>) {
        self.edit(|meal| meal.recipe_id = recipe_id);
    }

    pub fn set_todo_item(&mut self, todo_item_id: Option<String>) {
        self.edit(|meal| meal.todo_item_id = todo_item_id);
    }

    pub fn add_shopping_list_item(&mut self, item_id: &str) {
        self.edit(|meal| {
            if !meal.shopping_list_item_ids.iter().any(|id| id == item_id) {
                meal.shopping_list_item_ids.push(item_id.to_string());
            }
        });
    }

    pub fn remove_shopping_list_item(&mut self, item_id: &str) {
        self.edit(|meal| meal.shopping_list_item_ids.retain(|id| id != item_id));
    }

    pub(crate) fn replace_space_ids(&mut self, space_ids: BTreeSet<String>) {
        self.edit(|meal| meal.space_ids = space_ids);
    }
}
