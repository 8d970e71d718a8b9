//! Recipe model with embedded ingredient and step values.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{new_id, EntityKind, SyncState, Synchronizable};

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
}

/// One preparation step of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeStep {
    pub position: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub(crate) id: String,
    pub(crate) sync: SyncState,
    pub(crate) title: String,
    pub(crate) details: String,
    pub(crate) servings: Option<u32>,
    pub(crate) ingredients: Vec<Ingredient>,
    pub(crate) steps: Vec<RecipeStep>,
    /// Meals cooking this recipe (inverse of `Meal::recipe_id`).
    pub(crate) meal_ids: Vec<String>,
    /// Derived by the space relationship service.
    pub(crate) space_ids: BTreeSet<String>,
}

impl_synchronizable!(Recipe, EntityKind::Recipe);

impl Recipe {
    #[must_use]
    pub fn new(owner_id: &str, title: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            sync: SyncState::local(Some(owner_id.to_string())),
            title: title.into(),
            details: details.into(),
            servings: None,
            ingredients: Vec::new(),
            steps: Vec::new(),
            meal_ids: Vec::new(),
            space_ids: BTreeSet::new(),
        }
    }

    pub(crate) fn from_remote(id: &str, title: String, details: String) -> Self {
        Self {
            id: id.to_string(),
            sync: SyncState::remote(),
            title,
            details,
            servings: None,
            ingredients: Vec::new(),
            steps: Vec::new(),
            meal_ids: Vec::new(),
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
    pub fn servings(&self) -> Option<u32> {
        self.servings
    }

    #[must_use]
    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    #[must_use]
    pub fn steps(&self) -> &[RecipeStep] {
        &self.steps
    }

    #[must_use]
    pub fn meal_ids(&self) -> &[String] {
        &self.meal_ids
    }

    #[must_use]
    pub fn space_ids(&self) -> &BTreeSet<String> {
        &self.space_ids
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.edit(|recipe| recipe.title = title);
    }

    pub fn set_details(&mut self, details: impl Into<String>) {
        let details = details.into();
        self.edit(|recipe| recipe.details = details);
    }

    pub fn set_servings(&mut self, servings: Option<u32>) {
        self.edit(|recipe| recipe.servings = servings);
    }

    pub fn add_ingredient(&mut self, ingredient: Ingredient) {
        self.edit(|recipe| recipe.ingredients.push(ingredient));
    }

    pub fn remove_ingredient(&mut self, name: &str) {
        self.edit(|recipe| recipe.ingredients.retain(|i| i.name != name));
    }

    /// Appends a step, numbering it after the current last step.
    pub fn add_step(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.edit(|recipe| {
            let position = recipe
                .steps
                .iter()
                .map(|s| s.position)
                .max()
                .map_or(1, |p| p.saturating_add(1));
            recipe.steps.push(RecipeStep { position, text });
        });
    }

    pub(crate) fn replace_space_ids(&mut self, space_ids: BTreeSet<String>) {
        self.edit(|recipe| recipe.space_ids = space_ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_step_numbers_after_last() {
        let mut recipe = Recipe::new("u1", "Bread", "Knead");
        recipe.add_step("mix");
        recipe.add_step("bake");
        let positions: Vec<u32> = recipe.steps().iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 2]);
    }

    #[test]
    fn test_add_step_after_max_position_does_not_overflow() {
        let mut recipe = Recipe::new("u1", "Bread", "Knead");
        recipe.steps.push(RecipeStep {
            position: u32::MAX,
            text: "rest".to_string(),
        });

        recipe.add_step("serve");
        assert_eq!(recipe.steps().last().map(|s| s.position), Some(u32::MAX));
    }
}
