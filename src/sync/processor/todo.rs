use crate::model::{
    EntityKind, Meal, ShoppingListItem, Synchronizable, TodoItem, TodoItemEvent, User,
};
use crate::storage::EntityStore;
use crate::sync::processor::{Applied, Processor, RecordContext};
use crate::sync::records::TodoItemRecord;

/// Todo items require `title` and `details` on creation.
///
/// `categoryName` goes through the category resolver, which creates a
/// category the first time a name is seen, so it never dangles.
#[derive(Debug, Default, Clone, Copy)]
pub struct TodoItemProcessor;

impl Processor for TodoItemProcessor {
    const KIND: EntityKind = EntityKind::TodoItem;

    type Record = TodoItemRecord;

    fn apply(
        &self,
        store: &mut EntityStore,
        record: TodoItemRecord,
        ctx: &mut RecordContext<'_>,
    ) -> Applied {
        let uid = ctx.uid();
        let (mut item, applied) = match store.fetch_unique::<TodoItem>(uid) {
            Some(existing) => (existing.clone(), Applied::Updated),
            None => {
                let Some(title) = record.title.clone() else {
                    return ctx.missing_field("title");
                };
                let Some(details) = record.details.clone() else {
                    return ctx.missing_field("details");
                };
                let item = TodoItem::from_remote(uid, title, details);
                store.insert(item.clone());
                (item, Applied::Created)
            }
        };

        if let Some(title) = record.title {
            item.title = title;
        }
        if let Some(details) = record.details {
            item.details = details;
        }
        if record.due_date.is_some() {
            item.due_date = record.due_date;
        }
        if let Some(completed) = record.is_completed {
            item.is_completed = completed;
        }

        let owner =
            ctx.resolve::<User>(store, "ownerId", item.owner_id(), record.owner_id.as_deref());
        item.sync.assign_owner(owner);

        item.category_id = record
            .category_name
            .as_deref()
            .and_then(|name| store.fetch_or_create_category(name))
            .map(|category| category.id().to_string());

        item.meal_id =
            ctx.resolve::<Meal>(store, "mealId", item.meal_id.as_deref(), record.meal_id.as_deref());
        item.shopping_list_item_id = ctx.resolve::<ShoppingListItem>(
            store,
            "shoppingListItemId",
            item.shopping_list_item_id.as_deref(),
            record.shopping_list_item_id.as_deref(),
        );

        if let Some(event_ids) =
            ctx.reconcile::<TodoItemEvent>(store, "eventIds", &item.event_ids, &record.event_ids)
        {
            item.event_ids = event_ids;
        }

        item.sync.mark_synced();
        store.insert(item);
        applied
    }
}
