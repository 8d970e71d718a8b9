//! Ingestion cycle driver.
//!
//! The coordinator runs the per-kind processors in dependency order and
//! saves the store after each kind, so a later kind can resolve references
//! to entities created by an earlier one. References pointing "forward" in
//! that order (a todo item naming a meal that arrives later in the same
//! payload) stay dangling until the next cycle re-sends them.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::model::EntityKind;
use crate::storage::EntityStore;
use crate::sync::processor::{
    MealProcessor, Processor, RecipeProcessor, ShoppingListItemProcessor, TodoItemProcessor,
    UserProcessor,
};
use crate::sync::types::{IngestionReport, ProcessingReport, RecordIssue, SyncError, SyncResult};

/// Kinds in the order they are ingested.
pub const INGESTION_ORDER: [EntityKind; 5] = [
    EntityKind::User,
    EntityKind::Recipe,
    EntityKind::TodoItem,
    EntityKind::Meal,
    EntityKind::ShoppingListItem,
];

/// One ingestion payload: kind key to a batch of raw field maps.
///
/// Values are kept as raw JSON so that one badly shaped batch is reported
/// against its own kind instead of rejecting the whole payload.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct IngestionPayload {
    batches: BTreeMap<String, Value>,
}

impl IngestionPayload {
    /// Parse a payload from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidPayload`] unless the text is a JSON
    /// object.
    pub fn from_json_str(json: &str) -> SyncResult<Self> {
        serde_json::from_str(json).map_err(|err| SyncError::InvalidPayload(err.to_string()))
    }

    /// Build a payload from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Same as [`IngestionPayload::from_json_str`].
    pub fn from_value(value: Value) -> SyncResult<Self> {
        serde_json::from_value(value).map_err(|err| SyncError::InvalidPayload(err.to_string()))
    }

    /// Set the batch for `kind`, replacing any previous one.
    pub fn insert(&mut self, kind: EntityKind, batch: Vec<Value>) {
        if let Some(key) = kind.payload_key() {
            self.batches.insert(key.to_string(), Value::Array(batch));
        }
    }

    fn take(&mut self, kind: EntityKind) -> Option<Value> {
        kind.payload_key().and_then(|key| self.batches.remove(key))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

/// Runs ingestion cycles against one store.
#[derive(Debug)]
pub struct Coordinator<'a> {
    store: &'a mut EntityStore,
}

impl<'a> Coordinator<'a> {
    #[must_use]
    pub fn new(store: &'a mut EntityStore) -> Self {
        Self { store }
    }

    /// Ingest one payload.
    ///
    /// Kinds missing from the payload are skipped. Record-level problems and
    /// batches that are not arrays end up in the report.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Persistence`] if saving the store fails after a
    /// kind. Kinds saved before the failure stay saved; re-running the same
    /// payload converges.
    pub fn run(&mut self, mut payload: IngestionPayload) -> SyncResult<IngestionReport> {
        let mut report = IngestionReport::default();

        for kind in INGESTION_ORDER {
            let Some(value) = payload.take(kind) else {
                continue;
            };
            let processed = match value {
                Value::Array(batch) => self.process_kind(kind, batch),
                other => not_a_batch(kind, &other),
            };
            report.kinds.push(processed);

            let saved = self.store.save().map_err(|err| SyncError::Persistence {
                kind,
                message: err.to_string(),
            })?;
            report.saved.upserted += saved.upserted;
            report.saved.deleted += saved.deleted;
        }

        for key in payload.batches.into_keys() {
            warn!(key = %key, "unknown payload kind ignored");
            report.unknown_kinds.push(key);
        }

        info!(
            records = report.total_processed(),
            issues = report.total_issues(),
            upserted = report.saved.upserted,
            deleted = report.saved.deleted,
            "ingestion cycle complete"
        );
        Ok(report)
    }

    fn process_kind(&mut self, kind: EntityKind, batch: Vec<Value>) -> ProcessingReport {
        match kind {
            EntityKind::User => UserProcessor.process(self.store, batch),
            EntityKind::Recipe => RecipeProcessor.process(self.store, batch),
            EntityKind::TodoItem => TodoItemProcessor.process(self.store, batch),
            EntityKind::Meal => MealProcessor.process(self.store, batch),
            EntityKind::ShoppingListItem => ShoppingListItemProcessor.process(self.store, batch),
            EntityKind::TodoItemCategory | EntityKind::TodoItemEvent | EntityKind::Space => {
                ProcessingReport::new(kind)
            }
        }
    }
}

fn not_a_batch(kind: EntityKind, value: &Value) -> ProcessingReport {
    let found = match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    let issue = RecordIssue::NotABatch { found };
    warn!(kind = %kind, "{issue}");

    let mut report = ProcessingReport::new(kind);
    report.issues.push(issue);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Meal, Recipe, Synchronizable, User};
    use crate::storage::MemoryBackend;
    use serde_json::json;

    fn payload(value: Value) -> IngestionPayload {
        IngestionPayload::from_value(value).unwrap()
    }

    fn scenario() -> Value {
        json!({
            "users": [{"uid": "u1"}],
            "recipes": [{"uid": "r1", "title": "Soup", "details": "d", "ownerId": "u1"}],
            "meals": [{
                "uid": "m1",
                "scalingFactor": 1.0,
                "mealType": "dinner",
                "ownerId": "u1",
                "recipeId": "r1"
            }]
        })
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut store = EntityStore::in_memory();
        let report = Coordinator::new(&mut store).run(payload(scenario())).unwrap();

        assert_eq!(report.kinds.len(), 3);
        assert_eq!(report.total_issues(), 0);

        let meal = store.fetch_unique::<Meal>("m1").unwrap();
        assert_eq!(meal.owner_id(), Some("u1"));
        assert_eq!(meal.recipe_id(), Some("r1"));
        assert!(!meal.is_dirty());
        assert!(store.contains::<User>("u1"));
        assert!(store.contains::<Recipe>("r1"));
    }

    #[test]
    fn test_second_identical_run_writes_nothing() {
        let mut store = EntityStore::in_memory();
        let first = Coordinator::new(&mut store).run(payload(scenario())).unwrap();
        assert!(first.saved.upserted >= 3);

        let before: Vec<Meal> = store.all::<Meal>().cloned().collect();
        let second = Coordinator::new(&mut store).run(payload(scenario())).unwrap();

        assert!(second.saved.is_empty());
        let after: Vec<Meal> = store.all::<Meal>().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_deferred_reference_converges() {
        let mut store = EntityStore::in_memory();

        let first = Coordinator::new(&mut store)
            .run(payload(json!({
                "meals": [{"uid": "m1", "scalingFactor": 1.0, "mealType": "lunch", "recipeId": "r1"}]
            })))
            .unwrap();
        assert_eq!(first.report_for(EntityKind::Meal).unwrap().dangling().count(), 1);
        assert_eq!(store.fetch_unique::<Meal>("m1").unwrap().recipe_id(), None);

        Coordinator::new(&mut store)
            .run(payload(json!({
                "recipes": [{"uid": "r1", "title": "Salad", "details": "d"}],
                "meals": [{"uid": "m1", "recipeId": "r1"}]
            })))
            .unwrap();
        assert_eq!(store.fetch_unique::<Meal>("m1").unwrap().recipe_id(), Some("r1"));
    }

    #[test]
    fn test_unknown_and_missing_kinds() {
        let mut store = EntityStore::in_memory();
        let report = Coordinator::new(&mut store)
            .run(payload(json!({"users": [{"uid": "u1"}], "pantry": [{"uid": "p1"}]})))
            .unwrap();

        assert_eq!(report.kinds.len(), 1);
        assert_eq!(report.unknown_kinds, vec!["pantry".to_string()]);
    }

    #[test]
    fn test_invalid_payload_shape() {
        assert!(matches!(
            IngestionPayload::from_json_str("[1, 2]"),
            Err(SyncError::InvalidPayload(_))
        ));
        assert!(matches!(
            IngestionPayload::from_json_str("null"),
            Err(SyncError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_badly_shaped_batch_does_not_block_other_kinds() {
        let mut store = EntityStore::in_memory();
        let report = Coordinator::new(&mut store)
            .run(payload(json!({
                "users": [{"uid": "u1"}],
                "recipes": {"uid": "r1", "title": "Soup", "details": "d"},
                "meals": null,
                "pantry": {"shelf": 1}
            })))
            .unwrap();

        assert!(store.contains::<User>("u1"));
        assert!(!store.contains::<Recipe>("r1"));
        assert_eq!(report.report_for(EntityKind::User).unwrap().stats.created, 1);
        assert_eq!(
            report.report_for(EntityKind::Recipe).unwrap().issues,
            vec![RecordIssue::NotABatch { found: "an object" }]
        );
        assert_eq!(
            report.report_for(EntityKind::Meal).unwrap().issues,
            vec![RecordIssue::NotABatch { found: "null" }]
        );
        assert_eq!(report.unknown_kinds, vec!["pantry".to_string()]);
    }

    #[test]
    fn test_save_failure_aborts_cycle() {
        let mut store = EntityStore::with_backend(Box::new(MemoryBackend::failing())).unwrap();
        let result = Coordinator::new(&mut store).run(payload(scenario()));

        assert!(matches!(
            result,
            Err(SyncError::Persistence {
                kind: EntityKind::User,
                ..
            })
        ));
    }

    #[test]
    fn test_bad_record_does_not_block_other_kinds() {
        let mut store = EntityStore::in_memory();
        let report = Coordinator::new(&mut store)
            .run(payload(json!({
                "users": [{"name": "no id"}],
                "recipes": [{"uid": "r1", "title": "Soup", "details": "d"}]
            })))
            .unwrap();

        assert_eq!(report.report_for(EntityKind::User).unwrap().stats.skipped, 1);
        assert_eq!(report.report_for(EntityKind::Recipe).unwrap().stats.created, 1);
    }
}
