//! Data models for Hearth.
//!
//! This module contains the local object graph:
//! - User
//! - Recipe (with embedded Ingredient / RecipeStep values)
//! - TodoItem, TodoItemCategory, TodoItemEvent
//! - Meal
//! - ShoppingListItem
//! - Space
//!
//! References between entities are ids into the [`EntityStore`], never
//! owning pointers.
//!
//! [`EntityStore`]: crate::storage::EntityStore

/// Implements [`Synchronizable`] for an entity with `id` and `sync` fields.
///
/// Defined before the submodules so it is in textual scope for all of them.
macro_rules! impl_synchronizable {
    ($ty:ty, $kind:expr) => {
        impl $crate::model::Synchronizable for $ty {
            const KIND: $crate::model::EntityKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn sync_state(&self) -> &$crate::model::SyncState {
                &self.sync
            }

            fn sync_state_mut(&mut self) -> &mut $crate::model::SyncState {
                &mut self.sync
            }
        }
    };
}

pub mod meal;
pub mod recipe;
pub mod shopping;
pub mod space;
pub mod sync_state;
pub mod todo;
pub mod user;

pub use meal::{Meal, MealType};
pub use recipe::{Ingredient, Recipe, RecipeStep};
pub use shopping::ShoppingListItem;
pub use space::{SharePolicy, Space};
pub use sync_state::{new_id, now_millis, SyncState, Synchronizable};
pub use todo::{TodoItem, TodoItemCategory, TodoItemEvent};
pub use user::User;

use serde::{Deserialize, Serialize};

/// Every entity kind held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Recipe,
    TodoItem,
    TodoItemCategory,
    TodoItemEvent,
    Meal,
    ShoppingListItem,
    Space,
}

impl EntityKind {
    /// Kinds in storage load order.
    pub const ALL: [Self; 8] = [
        Self::User,
        Self::Recipe,
        Self::TodoItemCategory,
        Self::TodoItem,
        Self::TodoItemEvent,
        Self::Meal,
        Self::ShoppingListItem,
        Self::Space,
    ];

    /// Storage / log representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Recipe => "recipe",
            Self::TodoItem => "todo_item",
            Self::TodoItemCategory => "todo_item_category",
            Self::TodoItemEvent => "todo_item_event",
            Self::Meal => "meal",
            Self::ShoppingListItem => "shopping_list_item",
            Self::Space => "space",
        }
    }

    /// Key used for this kind in ingestion and egress payloads.
    ///
    /// Only the five remotely ingested kinds have one.
    #[must_use]
    pub const fn payload_key(&self) -> Option<&'static str> {
        match self {
            Self::User => Some("users"),
            Self::Recipe => Some("recipes"),
            Self::TodoItem => Some("todoItems"),
            Self::Meal => Some("meals"),
            Self::ShoppingListItem => Some("shoppingListItems"),
            Self::TodoItemCategory | Self::TodoItemEvent | Self::Space => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown entity kind: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_entity_kind_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
        assert!("widget".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_payload_keys() {
        assert_eq!(EntityKind::TodoItem.payload_key(), Some("todoItems"));
        assert_eq!(EntityKind::Space.payload_key(), None);
    }

    /// One clean entity of every synchronizable kind.
    struct Household {
        user: User,
        recipe: Recipe,
        todo: TodoItem,
        event: TodoItemEvent,
        meal: Meal,
        shopping: ShoppingListItem,
        space: Space,
    }

    fn clean<T: Synchronizable>(mut entity: T) -> T {
        entity.sync_state_mut().mark_synced();
        entity
    }

    fn household() -> Household {
        let todo = TodoItem::new("u1", "Buy leeks", "");
        let event = TodoItemEvent::new(&todo, "created");
        Household {
            user: clean(User::new("Ada")),
            recipe: clean(Recipe::new("u1", "Soup", "Simmer")),
            event: clean(event),
            todo: clean(todo),
            meal: clean(Meal::new("u1", MealType::Dinner, 1.0)),
            shopping: clean(ShoppingListItem::new("u1", "Leeks")),
            space: clean(Space::new("u1", "Family")),
        }
    }

    /// Every public mutator of the model.
    #[derive(Debug, Clone)]
    enum Mutation {
        UserName(String),
        UserAddFriend(String),
        UserRemoveFriend(String),
        RecipeTitle(String),
        RecipeDetails(String),
        RecipeServings(Option<u32>),
        RecipeAddIngredient(String),
        RecipeRemoveIngredient(String),
        RecipeAddStep(String),
        TodoTitle(String),
        TodoDetails(String),
        TodoDueDate(Option<i64>),
        TodoCompleted(bool),
        TodoCategory(Option<String>),
        TodoAddEvent(String),
        EventSummary(String),
        MealScaling(f64),
        MealType(MealType),
        MealDate(Option<i64>),
        MealRecipe(Option<String>),
        MealTodoItem(Option<String>),
        MealAddShoppingItem(String),
        MealRemoveShoppingItem(String),
        ShoppingName(String),
        ShoppingQuantity(Option<String>),
        ShoppingPurchased(bool),
        ShoppingTodoItem(Option<String>),
        ShoppingAddMeal(String),
        ShoppingRemoveMeal(String),
        SpaceName(String),
        SpaceAddMember(String),
        SpaceRemoveMember(String),
        SpaceShareCategory(String),
        SpaceUnshareCategory(String),
        SpacePolicy(SharePolicy, bool),
        Owner(EntityKind, Option<String>),
    }

    fn id() -> impl Strategy<Value = String> {
        "[a-z][0-9]{1,2}"
    }

    fn text() -> impl Strategy<Value = String> {
        "[a-z ]{0,12}"
    }

    fn user_mutation() -> impl Strategy<Value = Mutation> {
        prop_oneof![
            text().prop_map(Mutation::UserName),
            id().prop_map(Mutation::UserAddFriend),
            id().prop_map(Mutation::UserRemoveFriend),
        ]
    }

    fn recipe_mutation() -> impl Strategy<Value = Mutation> {
        prop_oneof![
            text().prop_map(Mutation::RecipeTitle),
            text().prop_map(Mutation::RecipeDetails),
            proptest::option::of(0u32..12).prop_map(Mutation::RecipeServings),
            text().prop_map(Mutation::RecipeAddIngredient),
            text().prop_map(Mutation::RecipeRemoveIngredient),
            text().prop_map(Mutation::RecipeAddStep),
        ]
    }

    fn todo_mutation() -> impl Strategy<Value = Mutation> {
        prop_oneof![
            text().prop_map(Mutation::TodoTitle),
            text().prop_map(Mutation::TodoDetails),
            proptest::option::of(0i64..1_000_000).prop_map(Mutation::TodoDueDate),
            any::<bool>().prop_map(Mutation::TodoCompleted),
            proptest::option::of(id()).prop_map(Mutation::TodoCategory),
            id().prop_map(Mutation::TodoAddEvent),
            text().prop_map(Mutation::EventSummary),
        ]
    }

    fn meal_mutation() -> impl Strategy<Value = Mutation> {
        let meal_type = prop_oneof![
            Just(MealType::Breakfast),
            Just(MealType::Lunch),
            Just(MealType::Dinner),
            Just(MealType::Snack),
        ];
        prop_oneof![
            (0.25f64..4.0).prop_map(Mutation::MealScaling),
            meal_type.prop_map(Mutation::MealType),
            proptest::option::of(0i64..1_000_000).prop_map(Mutation::MealDate),
            proptest::option::of(id()).prop_map(Mutation::MealRecipe),
            proptest::option::of(id()).prop_map(Mutation::MealTodoItem),
            id().prop_map(Mutation::MealAddShoppingItem),
            id().prop_map(Mutation::MealRemoveShoppingItem),
        ]
    }

    fn shopping_mutation() -> impl Strategy<Value = Mutation> {
        prop_oneof![
            text().prop_map(Mutation::ShoppingName),
            proptest::option::of("[0-9]{1,3}").prop_map(Mutation::ShoppingQuantity),
            any::<bool>().prop_map(Mutation::ShoppingPurchased),
            proptest::option::of(id()).prop_map(Mutation::ShoppingTodoItem),
            id().prop_map(Mutation::ShoppingAddMeal),
            id().prop_map(Mutation::ShoppingRemoveMeal),
        ]
    }

    fn space_mutation() -> impl Strategy<Value = Mutation> {
        let policy = prop_oneof![
            Just(SharePolicy::Recipes),
            Just(SharePolicy::Meals),
            Just(SharePolicy::ShoppingItems),
        ];
        prop_oneof![
            text().prop_map(Mutation::SpaceName),
            id().prop_map(Mutation::SpaceAddMember),
            id().prop_map(Mutation::SpaceRemoveMember),
            id().prop_map(Mutation::SpaceShareCategory),
            id().prop_map(Mutation::SpaceUnshareCategory),
            (policy, any::<bool>()).prop_map(|(p, on)| Mutation::SpacePolicy(p, on)),
        ]
    }

    fn owner_mutation() -> impl Strategy<Value = Mutation> {
        let kind = prop_oneof![
            Just(EntityKind::User),
            Just(EntityKind::Recipe),
            Just(EntityKind::TodoItem),
            Just(EntityKind::TodoItemEvent),
            Just(EntityKind::Meal),
            Just(EntityKind::ShoppingListItem),
            Just(EntityKind::Space),
        ];
        (kind, proptest::option::of(id())).prop_map(|(k, owner)| Mutation::Owner(k, owner))
    }

    fn mutation() -> impl Strategy<Value = Mutation> {
        prop_oneof![
            user_mutation(),
            recipe_mutation(),
            todo_mutation(),
            meal_mutation(),
            shopping_mutation(),
            space_mutation(),
            owner_mutation(),
        ]
    }

    /// Apply `change` to a clean entity; returns (dirty, `last_modified` before, after).
    fn touch<T: Synchronizable>(entity: &mut T, change: impl FnOnce(&mut T)) -> (bool, i64, i64) {
        assert!(!entity.is_dirty());
        let before = entity.last_modified();
        change(entity);
        (entity.is_dirty(), before, entity.last_modified())
    }

    fn apply(h: &mut Household, mutation: Mutation) -> (bool, i64, i64) {
        match mutation {
            Mutation::UserName(v) => touch(&mut h.user, |e| e.set_name(v)),
            Mutation::UserAddFriend(v) => touch(&mut h.user, |e| e.add_friend(&v)),
            Mutation::UserRemoveFriend(v) => touch(&mut h.user, |e| e.remove_friend(&v)),
            Mutation::RecipeTitle(v) => touch(&mut h.recipe, |e| e.set_title(v)),
            Mutation::RecipeDetails(v) => touch(&mut h.recipe, |e| e.set_details(v)),
            Mutation::RecipeServings(v) => touch(&mut h.recipe, |e| e.set_servings(v)),
            Mutation::RecipeAddIngredient(name) => touch(&mut h.recipe, |e| {
                e.add_ingredient(Ingredient {
                    name,
                    quantity: None,
                });
            }),
            Mutation::RecipeRemoveIngredient(v) => {
                touch(&mut h.recipe, |e| e.remove_ingredient(&v))
            }
            Mutation::RecipeAddStep(v) => touch(&mut h.recipe, |e| e.add_step(v)),
            Mutation::TodoTitle(v) => touch(&mut h.todo, |e| e.set_title(v)),
            Mutation::TodoDetails(v) => touch(&mut h.todo, |e| e.set_details(v)),
            Mutation::TodoDueDate(v) => touch(&mut h.todo, |e| e.set_due_date(v)),
            Mutation::TodoCompleted(v) => touch(&mut h.todo, |e| e.set_completed(v)),
            Mutation::TodoCategory(v) => touch(&mut h.todo, |e| e.set_category(v)),
            Mutation::TodoAddEvent(v) => touch(&mut h.todo, |e| e.add_event(&v)),
            Mutation::EventSummary(v) => touch(&mut h.event, |e| e.set_summary(v)),
            Mutation::MealScaling(v) => touch(&mut h.meal, |e| e.set_scaling_factor(v)),
            Mutation::MealType(v) => touch(&mut h.meal, |e| e.set_meal_type(v)),
            Mutation::MealDate(v) => touch(&mut h.meal, |e| e.set_date(v)),
            Mutation::MealRecipe(v) => touch(&mut h.meal, |e| e.set_recipe(v)),
            Mutation::MealTodoItem(v) => touch(&mut h.meal, |e| e.set_todo_item(v)),
            Mutation::MealAddShoppingItem(v) => {
                touch(&mut h.meal, |e| e.add_shopping_list_item(&v))
            }
            Mutation::MealRemoveShoppingItem(v) => {
                touch(&mut h.meal, |e| e.remove_shopping_list_item(&v))
            }
            Mutation::ShoppingName(v) => touch(&mut h.shopping, |e| e.set_name(v)),
            Mutation::ShoppingQuantity(v) => touch(&mut h.shopping, |e| e.set_quantity(v)),
            Mutation::ShoppingPurchased(v) => touch(&mut h.shopping, |e| e.set_purchased(v)),
            Mutation::ShoppingTodoItem(v) => touch(&mut h.shopping, |e| e.set_todo_item(v)),
            Mutation::ShoppingAddMeal(v) => touch(&mut h.shopping, |e| e.add_meal(&v)),
            Mutation::ShoppingRemoveMeal(v) => touch(&mut h.shopping, |e| e.remove_meal(&v)),
            Mutation::SpaceName(v) => touch(&mut h.space, |e| e.set_name(v)),
            Mutation::SpaceAddMember(v) => touch(&mut h.space, |e| e.add_member(&v)),
            Mutation::SpaceRemoveMember(v) => touch(&mut h.space, |e| e.remove_member(&v)),
            Mutation::SpaceShareCategory(v) => touch(&mut h.space, |e| e.share_category(&v)),
            Mutation::SpaceUnshareCategory(v) => {
                touch(&mut h.space, |e| e.unshare_category(&v))
            }
            Mutation::SpacePolicy(policy, on) => {
                touch(&mut h.space, |e| e.set_policy(policy, on))
            }
            Mutation::Owner(kind, owner) => match kind {
                EntityKind::User => touch(&mut h.user, |e| e.set_owner(owner)),
                EntityKind::Recipe => touch(&mut h.recipe, |e| e.set_owner(owner)),
                EntityKind::TodoItem => touch(&mut h.todo, |e| e.set_owner(owner)),
                EntityKind::TodoItemEvent => touch(&mut h.event, |e| e.set_owner(owner)),
                EntityKind::Meal => touch(&mut h.meal, |e| e.set_owner(owner)),
                EntityKind::ShoppingListItem => touch(&mut h.shopping, |e| e.set_owner(owner)),
                EntityKind::Space | EntityKind::TodoItemCategory => {
                    touch(&mut h.space, |e| e.set_owner(owner))
                }
            },
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

        #[test]
        fn prop_every_public_mutator_marks_dirty(mutation in mutation()) {
            let mut household = household();
            let (dirty, before, after) = apply(&mut household, mutation);
            prop_assert!(dirty);
            prop_assert!(after >= before);
        }
    }
}
