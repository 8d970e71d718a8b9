//! Egress export.
//!
//! Collects every dirty entity of the remotely synced kinds, encodes it as
//! its boundary record and writes one payload in the same shape ingestion
//! accepts. Exporting does not clear dirty flags: an entity only becomes
//! clean when the remote side echoes it back through ingestion.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::model::{Meal, Recipe, ShoppingListItem, TodoItem, User};
use crate::storage::EntityStore;
use crate::sync::file::atomic_write;
use crate::sync::records::{
    MealRecord, RecipeRecord, ShoppingListItemRecord, TodoItemRecord, UserRecord,
};
use crate::sync::types::{ExportStats, SyncError, SyncResult};

/// Outgoing payload, keyed like the ingestion payload.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EgressPayload {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<UserRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipes: Vec<RecipeRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub todo_items: Vec<TodoItemRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meals: Vec<MealRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shopping_list_items: Vec<ShoppingListItemRecord>,
}

impl EgressPayload {
    #[must_use]
    pub fn stats(&self) -> ExportStats {
        ExportStats {
            users: self.users.len(),
            recipes: self.recipes.len(),
            todo_items: self.todo_items.len(),
            meals: self.meals.len(),
            shopping_list_items: self.shopping_list_items.len(),
        }
    }
}

/// Exporter for the egress payload file.
#[derive(Debug)]
pub struct Exporter<'a> {
    store: &'a EntityStore,
    output: PathBuf,
}

impl<'a> Exporter<'a> {
    #[must_use]
    pub fn new(store: &'a EntityStore, output: PathBuf) -> Self {
        Self { store, output }
    }

    /// Get the output file path.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Encode every dirty entity.
    #[must_use]
    pub fn collect(&self) -> EgressPayload {
        let store = self.store;
        EgressPayload {
            users: store.dirty::<User>().map(UserRecord::from).collect(),
            recipes: store.dirty::<Recipe>().map(RecipeRecord::from).collect(),
            todo_items: store
                .dirty::<TodoItem>()
                .map(|item| TodoItemRecord::encode(item, store))
                .collect(),
            meals: store.dirty::<Meal>().map(MealRecord::from).collect(),
            shopping_list_items: store
                .dirty::<ShoppingListItem>()
                .map(ShoppingListItemRecord::from)
                .collect(),
        }
    }

    /// Write the dirty entities to the output file.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NothingToExport`] if nothing is dirty (the file is
    /// left untouched), or an error if the file cannot be written.
    pub fn export(&self) -> SyncResult<ExportStats> {
        let payload = self.collect();
        let stats = payload.stats();
        if stats.is_empty() {
            return Err(SyncError::NothingToExport);
        }

        let json = serde_json::to_string_pretty(&payload)?;
        atomic_write(&self.output, &json)?;

        info!(
            records = stats.total(),
            path = %self.output.display(),
            "egress payload written"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MealType, SharePolicy, Space, Synchronizable};
    use crate::sharing::update_all_space_relationships;
    use crate::sync::coordinator::{Coordinator, IngestionPayload};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn test_export_nothing_dirty() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("payload.json");
        let store = EntityStore::in_memory();

        let result = Exporter::new(&store, output.clone()).export();
        assert!(matches!(result, Err(SyncError::NothingToExport)));
        assert!(!output.exists());
    }

    #[test]
    fn test_export_only_dirty_entities() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("outbox").join("payload.json");
        let mut store = EntityStore::in_memory();
        Coordinator::new(&mut store)
            .run(
                IngestionPayload::from_value(json!({
                    "users": [{"uid": "u1"}],
                    "recipes": [{"uid": "r1", "title": "Soup", "details": "d", "ownerId": "u1"}]
                }))
                .unwrap(),
            )
            .unwrap();

        let meal = Meal::new("u1", MealType::Snack, 0.5);
        let meal_id = meal.id().to_string();
        store.insert(meal);

        let stats = Exporter::new(&store, output.clone()).export().unwrap();
        assert_eq!(stats.total(), 1);
        assert_eq!(stats.meals, 1);

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["meals"][0]["uid"], meal_id.as_str());
        assert!(written.get("recipes").is_none());

        // Export leaves the entity dirty.
        assert!(store.fetch_unique::<Meal>(&meal_id).unwrap().is_dirty());
    }

    #[test]
    fn test_exported_payload_reingests_clean() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("payload.json");
        let mut store = EntityStore::in_memory();
        let user = User::new("Ada");
        let user_id = user.id().to_string();
        store.insert(user);
        let recipe = Recipe::new(&user_id, "Bread", "Knead");
        let recipe_id = recipe.id().to_string();
        store.insert(recipe);

        Exporter::new(&store, output.clone()).export().unwrap();
        let payload =
            IngestionPayload::from_json_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        let report = Coordinator::new(&mut store).run(payload).unwrap();

        assert_eq!(report.total_issues(), 0);
        let recipe = store.fetch_unique::<Recipe>(&recipe_id).unwrap();
        assert!(!recipe.is_dirty());
        assert_eq!(recipe.owner_id(), Some(user_id.as_str()));
        assert!(Exporter::new(&store, output).collect().stats().is_empty());
    }

    #[test]
    fn test_export_carries_space_ids_after_reshare() {
        let mut store = EntityStore::in_memory();
        Coordinator::new(&mut store)
            .run(
                IngestionPayload::from_value(json!({
                    "users": [{"uid": "u1"}],
                    "recipes": [{"uid": "r1", "title": "Soup", "details": "d", "ownerId": "u1"}]
                }))
                .unwrap(),
            )
            .unwrap();

        let mut space = Space::new("u1", "Family");
        space.set_policy(SharePolicy::Recipes, true);
        let space_id = space.id().to_string();
        store.insert(space);
        update_all_space_relationships(&mut store, "u1");

        let payload = Exporter::new(&store, PathBuf::from("unused.json")).collect();
        assert_eq!(payload.recipes.len(), 1);
        assert_eq!(payload.recipes[0].space_ids, vec![space_id.clone()]);

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["recipes"][0]["spaceIds"], json!([space_id]));
    }

    #[test]
    fn test_ingested_space_ids_are_ignored() {
        let mut store = EntityStore::in_memory();
        Coordinator::new(&mut store)
            .run(
                IngestionPayload::from_value(json!({
                    "recipes": [{"uid": "r1", "title": "Soup", "details": "d", "spaceIds": ["s9"]}]
                }))
                .unwrap(),
            )
            .unwrap();

        assert!(store.fetch_unique::<Recipe>("r1").unwrap().space_ids().is_empty());
    }
}
