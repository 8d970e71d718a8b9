use crate::model::{EntityKind, Meal, ShoppingListItem, Synchronizable, TodoItem, User};
use crate::storage::EntityStore;
use crate::sync::processor::{Applied, Processor, RecordContext};
use crate::sync::records::ShoppingListItemRecord;

/// Shopping list items require `name` on creation.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShoppingListItemProcessor;

impl Processor for ShoppingListItemProcessor {
    const KIND: EntityKind = EntityKind::ShoppingListItem;

    type Record = ShoppingListItemRecord;

    fn apply(
        &self,
        store: &mut EntityStore,
        record: ShoppingListItemRecord,
        ctx: &mut RecordContext<'_>,
    ) -> Applied {
        let uid = ctx.uid();
        let (mut item, applied) = match store.fetch_unique::<ShoppingListItem>(uid) {
            Some(existing) => (existing.clone(), Applied::Updated),
            None => {
                let Some(name) = record.name.clone() else {
                    return ctx.missing_field("name");
                };
                let item = ShoppingListItem::from_remote(uid, name);
                store.insert(item.clone());
                (item, Applied::Created)
            }
        };

        if let Some(name) = record.name {
            item.name = name;
        }
        if record.quantity.is_some() {
            item.quantity = record.quantity;
        }
        if let Some(purchased) = record.is_purchased {
            item.is_purchased = purchased;
        }

        let owner =
            ctx.resolve::<User>(store, "ownerId", item.owner_id(), record.owner_id.as_deref());
        item.sync.assign_owner(owner);

        item.todo_item_id = ctx.resolve::<TodoItem>(
            store,
            "todoItemId",
            item.todo_item_id.as_deref(),
            record.todo_item_id.as_deref(),
        );

        if let Some(meal_ids) =
            ctx.reconcile::<Meal>(store, "mealIds", &item.meal_ids, &record.meal_ids)
        {
            item.meal_ids = meal_ids;
        }

        item.sync.mark_synced();
        store.insert(item);
        applied
    }
}
