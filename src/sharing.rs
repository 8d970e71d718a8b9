//! Space relationship service.
//!
//! Space membership of content is derived, never authored. An entity owned
//! by user `u` is visible in space `S` when `u` is a member of `S` and:
//!
//! - recipes, meals, shopping list items: the matching share-all flag is on
//! - todo items: the item has a category whose name is among the names of
//!   `S`'s shared categories
//!
//! Todo item events follow their item. Recomputation is total: the whole
//! candidate set is rebuilt from every space and compared with the stored
//! set, and an entity is written (and marked dirty) only if it differs.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::model::{
    Meal, Recipe, SharePolicy, ShoppingListItem, Space, Synchronizable, TodoItem,
    TodoItemCategory, TodoItemEvent,
};
use crate::storage::{EntityStore, Stored};

/// A content entity whose space set can be recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRef {
    Recipe(String),
    Meal(String),
    ShoppingListItem(String),
    TodoItem(String),
}

/// Outcome of a recomputation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecomputeReport {
    /// Content entities examined.
    pub examined: usize,
    /// Content entities whose space set changed.
    pub changed: usize,
    /// Todo item events rewritten by the cascade.
    pub events_changed: usize,
}

impl RecomputeReport {
    fn absorb(&mut self, other: Self) {
        self.examined += other.examined;
        self.changed += other.changed;
        self.events_changed += other.events_changed;
    }
}

/// Entities carrying a derived space set.
trait Shared: Stored + Synchronizable {
    fn space_ids(&self) -> &BTreeSet<String>;

    fn replace_space_ids(&mut self, space_ids: BTreeSet<String>);
}

macro_rules! impl_shared {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Shared for $ty {
                fn space_ids(&self) -> &BTreeSet<String> {
                    <$ty>::space_ids(self)
                }

                fn replace_space_ids(&mut self, space_ids: BTreeSet<String>) {
                    <$ty>::replace_space_ids(self, space_ids);
                }
            }
        )+
    };
}

impl_shared!(Recipe, Meal, ShoppingListItem, TodoItem, TodoItemEvent);

/// Spaces where content governed by `policy` and owned by `owner` is visible.
#[must_use]
pub fn policy_spaces(
    store: &EntityStore,
    owner: Option<&str>,
    policy: SharePolicy,
) -> BTreeSet<String> {
    let Some(owner) = owner else {
        return BTreeSet::new();
    };
    store
        .all::<Space>()
        .filter(|space| space.has_member(owner) && space.policy(policy))
        .map(|space| space.id().to_string())
        .collect()
}

/// Spaces where a todo item owned by `owner` in `category_id` is visible.
#[must_use]
pub fn category_spaces(
    store: &EntityStore,
    owner: Option<&str>,
    category_id: Option<&str>,
) -> BTreeSet<String> {
    let (Some(owner), Some(category)) = (
        owner,
        category_id.and_then(|id| store.fetch_unique::<TodoItemCategory>(id)),
    ) else {
        return BTreeSet::new();
    };

    store
        .all::<Space>()
        .filter(|space| space.has_member(owner))
        .filter(|space| {
            store
                .fetch_many::<TodoItemCategory>(space.shared_category_ids().iter().map(String::as_str))
                .into_iter()
                .any(|shared| shared.name() == category.name())
        })
        .map(|space| space.id().to_string())
        .collect()
}

/// The space set `entity` should have, or `None` if it does not exist.
#[must_use]
pub fn visible_spaces(store: &EntityStore, entity: &ContentRef) -> Option<BTreeSet<String>> {
    match entity {
        ContentRef::Recipe(id) => store
            .fetch_unique::<Recipe>(id)
            .map(|recipe| policy_spaces(store, recipe.owner_id(), SharePolicy::Recipes)),
        ContentRef::Meal(id) => store
            .fetch_unique::<Meal>(id)
            .map(|meal| policy_spaces(store, meal.owner_id(), SharePolicy::Meals)),
        ContentRef::ShoppingListItem(id) => store
            .fetch_unique::<ShoppingListItem>(id)
            .map(|item| policy_spaces(store, item.owner_id(), SharePolicy::ShoppingItems)),
        ContentRef::TodoItem(id) => store
            .fetch_unique::<TodoItem>(id)
            .map(|item| category_spaces(store, item.owner_id(), item.category_id())),
    }
}

/// Recompute the space set of one content entity.
///
/// Unknown entities are ignored. A todo item whose set changes pushes the
/// same set to each of its events.
pub fn update_space_relationships(store: &mut EntityStore, entity: &ContentRef) -> RecomputeReport {
    let mut report = RecomputeReport::default();
    let Some(target) = visible_spaces(store, entity) else {
        debug!(?entity, "space recompute skipped for unknown entity");
        return report;
    };
    report.examined = 1;

    let changed = match entity {
        ContentRef::Recipe(id) => apply::<Recipe>(store, id, target),
        ContentRef::Meal(id) => apply::<Meal>(store, id, target),
        ContentRef::ShoppingListItem(id) => apply::<ShoppingListItem>(store, id, target),
        ContentRef::TodoItem(id) => {
            let event_ids = store
                .fetch_unique::<TodoItem>(id)
                .map(|item| item.event_ids().to_vec())
                .unwrap_or_default();
            let changed = apply::<TodoItem>(store, id, target.clone());
            if changed {
                for event_id in &event_ids {
                    if apply::<TodoItemEvent>(store, event_id, target.clone()) {
                        report.events_changed += 1;
                    }
                }
            }
            changed
        }
    };

    if changed {
        report.changed = 1;
        debug!(?entity, "space set changed");
    }
    report
}

/// Recompute every content entity owned by `user_id`.
pub fn update_all_space_relationships(store: &mut EntityStore, user_id: &str) -> RecomputeReport {
    let mut targets: Vec<ContentRef> = Vec::new();
    targets.extend(
        store
            .owned_by::<Recipe>(user_id)
            .map(|recipe| ContentRef::Recipe(recipe.id().to_string())),
    );
    targets.extend(
        store
            .owned_by::<Meal>(user_id)
            .map(|meal| ContentRef::Meal(meal.id().to_string())),
    );
    targets.extend(
        store
            .owned_by::<ShoppingListItem>(user_id)
            .map(|item| ContentRef::ShoppingListItem(item.id().to_string())),
    );
    targets.extend(
        store
            .owned_by::<TodoItem>(user_id)
            .map(|item| ContentRef::TodoItem(item.id().to_string())),
    );

    let mut report = RecomputeReport::default();
    for target in &targets {
        report.absorb(update_space_relationships(store, target));
    }
    debug!(
        user = user_id,
        examined = report.examined,
        changed = report.changed,
        "space relationships recomputed"
    );
    report
}

/// Recompute every content entity owned by any of `user_ids`.
pub fn update_for_users<I, S>(store: &mut EntityStore, user_ids: I) -> RecomputeReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report = RecomputeReport::default();
    let unique: BTreeSet<String> = user_ids
        .into_iter()
        .map(|id| id.as_ref().to_string())
        .collect();
    for user_id in &unique {
        report.absorb(update_all_space_relationships(store, user_id));
    }
    report
}

fn apply<T: Shared>(store: &mut EntityStore, id: &str, target: BTreeSet<String>) -> bool {
    let Some(entity) = store.fetch_unique_mut::<T>(id) else {
        return false;
    };
    if entity.space_ids() == &target {
        return false;
    }
    entity.replace_space_ids(target);
    true
}
