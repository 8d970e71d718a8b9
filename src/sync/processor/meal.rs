use crate::model::{
    EntityKind, Meal, MealType, Recipe, ShoppingListItem, Synchronizable, TodoItem, User,
};
use crate::storage::EntityStore;
use crate::sync::processor::{Applied, Processor, RecordContext};
use crate::sync::records::MealRecord;

/// Meals require `scalingFactor` and a known `mealType` on creation.
///
/// An unknown meal type on an existing meal is a field issue and leaves the
/// stored type unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct MealProcessor;

impl Processor for MealProcessor {
    const KIND: EntityKind = EntityKind::Meal;

    type Record = MealRecord;

    fn apply(
        &self,
        store: &mut EntityStore,
        record: MealRecord,
        ctx: &mut RecordContext<'_>,
    ) -> Applied {
        let uid = ctx.uid();
        let meal_type = record.meal_type.as_deref().map(str::parse::<MealType>);

        let (mut meal, applied) = match store.fetch_unique::<Meal>(uid) {
            Some(existing) => (existing.clone(), Applied::Updated),
            None => {
                let Some(scaling_factor) = record.scaling_factor else {
                    return ctx.missing_field("scalingFactor");
                };
                let meal_type = match &meal_type {
                    None => return ctx.missing_field("mealType"),
                    Some(Err(err)) => return ctx.malformed(err.clone()),
                    Some(Ok(meal_type)) => *meal_type,
                };
                let meal = Meal::from_remote(uid, meal_type, scaling_factor);
                store.insert(meal.clone());
                (meal, Applied::Created)
            }
        };

        if let Some(scaling_factor) = record.scaling_factor {
            meal.scaling_factor = scaling_factor;
        }
        match meal_type {
            Some(Ok(meal_type)) => meal.meal_type = meal_type,
            Some(Err(err)) => ctx.invalid_field("mealType", err),
            None => {}
        }
        if record.date.is_some() {
            meal.date = record.date;
        }

        let owner =
            ctx.resolve::<User>(store, "ownerId", meal.owner_id(), record.owner_id.as_deref());
        meal.sync.assign_owner(owner);

        meal.recipe_id = ctx.resolve::<Recipe>(
            store,
            "recipeId",
            meal.recipe_id.as_deref(),
            record.recipe_id.as_deref(),
        );
        meal.todo_item_id = ctx.resolve::<TodoItem>(
            store,
            "todoItemId",
            meal.todo_item_id.as_deref(),
            record.todo_item_id.as_deref(),
        );

        if let Some(item_ids) = ctx.reconcile::<ShoppingListItem>(
            store,
            "shoppingListItemIds",
            &meal.shopping_list_item_ids,
            &record.shopping_list_item_ids,
        ) {
            meal.shopping_list_item_ids = item_ids;
        }

        meal.sync.mark_synced();
        store.insert(meal);
        applied
    }
}
