use crate::model::{EntityKind, Meal, Recipe, Synchronizable, User};
use crate::storage::EntityStore;
use crate::sync::processor::{Applied, Processor, RecordContext};
use crate::sync::records::RecipeRecord;

/// Recipes require `title` and `details` on creation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecipeProcessor;

impl Processor for RecipeProcessor {
    const KIND: EntityKind = EntityKind::Recipe;

    type Record = RecipeRecord;

    fn apply(
        &self,
        store: &mut EntityStore,
        record: RecipeRecord,
        ctx: &mut RecordContext<'_>,
    ) -> Applied {
        let uid = ctx.uid();
        let (mut recipe, applied) = match store.fetch_unique::<Recipe>(uid) {
            Some(existing) => (existing.clone(), Applied::Updated),
            None => {
                let Some(title) = record.title.clone() else {
                    return ctx.missing_field("title");
                };
                let Some(details) = record.details.clone() else {
                    return ctx.missing_field("details");
                };
                let recipe = Recipe::from_remote(uid, title, details);
                store.insert(recipe.clone());
                (recipe, Applied::Created)
            }
        };

        if let Some(title) = record.title {
            recipe.title = title;
        }
        if let Some(details) = record.details {
            recipe.details = details;
        }
        if record.servings.is_some() {
            recipe.servings = record.servings;
        }
        if let Some(ingredients) = record.ingredients {
            recipe.ingredients = ingredients;
        }
        if let Some(steps) = record.steps {
            recipe.steps = steps;
        }

        let owner =
            ctx.resolve::<User>(store, "ownerId", recipe.owner_id(), record.owner_id.as_deref());
        recipe.sync.assign_owner(owner);

        if let Some(meal_ids) =
            ctx.reconcile::<Meal>(store, "mealIds", &recipe.meal_ids, &record.meal_ids)
        {
            recipe.meal_ids = meal_ids;
        }

        recipe.sync.mark_synced();
        store.insert(recipe);
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::types::RecordIssue;
    use serde_json::json;

    fn store_with_user(id: &str) -> EntityStore {
        let mut store = EntityStore::in_memory();
        crate::sync::processor::UserProcessor.process(&mut store, vec![json!({ "uid": id })]);
        store
    }

    #[test]
    fn test_creates_recipe_with_owner() {
        let mut store = store_with_user("u1");
        let report = RecipeProcessor.process(
            &mut store,
            vec![json!({
                "uid": "r1",
                "ownerId": "u1",
                "title": "Soup",
                "details": "Simmer",
                "servings": 4,
                "ingredients": [{"name": "leek", "quantity": "2"}],
                "steps": [{"position": 1, "text": "Chop"}]
            })],
        );

        assert_eq!(report.stats.created, 1);
        assert!(report.issues.is_empty());
        let recipe = store.fetch_unique::<Recipe>("r1").unwrap();
        assert_eq!(recipe.title(), "Soup");
        assert_eq!(recipe.servings(), Some(4));
        assert_eq!(recipe.ingredients().len(), 1);
        assert_eq!(recipe.steps()[0].text, "Chop");
        assert_eq!(recipe.owner_id(), Some("u1"));
        assert!(!recipe.is_dirty());
    }

    #[test]
    fn test_missing_mandatory_field_skips_creation() {
        let mut store = EntityStore::in_memory();
        let report = RecipeProcessor.process(&mut store, vec![json!({"uid": "r1", "title": "Soup"})]);

        assert_eq!(report.stats.skipped, 1);
        assert_eq!(
            report.issues,
            vec![RecordIssue::MissingField {
                uid: "r1".to_string(),
                field: "details"
            }]
        );
        assert!(!store.contains::<Recipe>("r1"));
    }

    #[test]
    fn test_partial_update_keeps_absent_scalars() {
        let mut store = store_with_user("u1");
        RecipeProcessor.process(
            &mut store,
            vec![json!({"uid": "r1", "ownerId": "u1", "title": "Soup", "details": "d", "servings": 2})],
        );

        let report = RecipeProcessor.process(
            &mut store,
            vec![json!({"uid": "r1", "ownerId": "u1", "title": "Stew"})],
        );

        assert_eq!(report.stats.updated, 1);
        let recipe = store.fetch_unique::<Recipe>("r1").unwrap();
        assert_eq!(recipe.title(), "Stew");
        assert_eq!(recipe.details(), "d");
        assert_eq!(recipe.servings(), Some(2));
    }

    #[test]
    fn test_unknown_owner_keeps_previous() {
        let mut store = store_with_user("u1");
        RecipeProcessor.process(
            &mut store,
            vec![json!({"uid": "r1", "ownerId": "u1", "title": "Soup", "details": "d"})],
        );

        let report = RecipeProcessor.process(
            &mut store,
            vec![json!({"uid": "r1", "ownerId": "u9"})],
        );

        assert_eq!(report.dangling().count(), 1);
        assert_eq!(store.fetch_unique::<Recipe>("r1").unwrap().owner_id(), Some("u1"));
    }
}
