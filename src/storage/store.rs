//! In-memory entity store (arena + id index) over a persistence backend.
//!
//! The store is the single shared mutable resource of the sync core. Passes
//! that write to it (an ingestion cycle, a space recomputation) borrow it
//! mutably, so only one of them can hold it at a time.
//!
//! # Change detection
//!
//! `save()` serializes every entity, hashes the JSON body and hands only
//! rows whose hash differs from the last persisted one to the backend. An
//! ingestion that changes nothing therefore writes nothing.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::model::{
    EntityKind, Meal, Recipe, ShoppingListItem, Space, Synchronizable, TodoItem,
    TodoItemCategory, TodoItemEvent, User,
};
use crate::storage::backend::{Backend, MemoryBackend, PersistedRow};
use crate::storage::sqlite::SqliteBackend;
use crate::sync::{has_changed, hash_str};

/// An entity type with its own table in the store.
pub trait Stored: Serialize + DeserializeOwned + Sized + 'static {
    const STORED_KIND: EntityKind;

    fn stored_id(&self) -> &str;

    fn table(store: &EntityStore) -> &BTreeMap<String, Self>;

    fn table_mut(store: &mut EntityStore) -> &mut BTreeMap<String, Self>;
}

macro_rules! impl_stored {
    ($ty:ty, $kind:expr, $field:ident) => {
        impl Stored for $ty {
            const STORED_KIND: EntityKind = $kind;

            fn stored_id(&self) -> &str {
                &self.id
            }

            fn table(store: &EntityStore) -> &BTreeMap<String, Self> {
                &store.$field
            }

            fn table_mut(store: &mut EntityStore) -> &mut BTreeMap<String, Self> {
                &mut store.$field
            }
        }
    };
}

impl_stored!(User, EntityKind::User, users);
impl_stored!(Recipe, EntityKind::Recipe, recipes);
impl_stored!(TodoItem, EntityKind::TodoItem, todo_items);
impl_stored!(TodoItemCategory, EntityKind::TodoItemCategory, categories);
impl_stored!(TodoItemEvent, EntityKind::TodoItemEvent, todo_events);
impl_stored!(Meal, EntityKind::Meal, meals);
impl_stored!(ShoppingListItem, EntityKind::ShoppingListItem, shopping_items);
impl_stored!(Space, EntityKind::Space, spaces);

/// Rows handed to the backend by one save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SaveStats {
    pub upserted: usize,
    pub deleted: usize,
}

impl SaveStats {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upserted == 0 && self.deleted == 0
    }
}

/// Per-kind totals for status output.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct KindStatus {
    pub kind: EntityKind,
    pub total: usize,
    /// `None` for kinds without sync state (categories).
    pub dirty: Option<usize>,
}

#[derive(Debug)]
pub struct EntityStore {
    backend: Box<dyn Backend>,
    users: BTreeMap<String, User>,
    recipes: BTreeMap<String, Recipe>,
    todo_items: BTreeMap<String, TodoItem>,
    categories: BTreeMap<String, TodoItemCategory>,
    todo_events: BTreeMap<String, TodoItemEvent>,
    meals: BTreeMap<String, Meal>,
    shopping_items: BTreeMap<String, ShoppingListItem>,
    spaces: BTreeMap<String, Space>,
    /// Content hash of every row as last persisted.
    persisted: HashMap<(EntityKind, String), String>,
    pending_deletes: BTreeSet<(EntityKind, String)>,
}

impl EntityStore {
    /// Build a store over `backend`, loading every persisted row.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or a row body does not
    /// decode into its kind.
    pub fn with_backend(backend: Box<dyn Backend>) -> Result<Self> {
        let rows = backend.load()?;
        let mut store = Self::empty(backend);
        for row in rows {
            match row.kind {
                EntityKind::User => store.load_row::<User>(row)?,
                EntityKind::Recipe => store.load_row::<Recipe>(row)?,
                EntityKind::TodoItem => store.load_row::<TodoItem>(row)?,
                EntityKind::TodoItemCategory => store.load_row::<TodoItemCategory>(row)?,
                EntityKind::TodoItemEvent => store.load_row::<TodoItemEvent>(row)?,
                EntityKind::Meal => store.load_row::<Meal>(row)?,
                EntityKind::ShoppingListItem => store.load_row::<ShoppingListItem>(row)?,
                EntityKind::Space => store.load_row::<Space>(row)?,
            }
        }
        info!(entities = store.persisted.len(), "entity store loaded");
        Ok(store)
    }

    /// Open a store persisted in the SQLite database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or loaded.
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_backend(Box::new(SqliteBackend::open(path)?))
    }

    /// A store over a fresh volatile backend.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::empty(Box::new(MemoryBackend::new()))
    }

    fn empty(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            users: BTreeMap::new(),
            recipes: BTreeMap::new(),
            todo_items: BTreeMap::new(),
            categories: BTreeMap::new(),
            todo_events: BTreeMap::new(),
            meals: BTreeMap::new(),
            shopping_items: BTreeMap::new(),
            spaces: BTreeMap::new(),
            persisted: HashMap::new(),
            pending_deletes: BTreeSet::new(),
        }
    }

    fn load_row<T: Stored>(&mut self, row: PersistedRow) -> Result<()> {
        let entity: T = serde_json::from_str(&row.body)?;
        self.persisted
            .insert((row.kind, row.id.clone()), row.content_hash);
        T::table_mut(self).insert(row.id, entity);
        Ok(())
    }

    // ==================
    // Lookup
    // ==================

    #[must_use]
    pub fn fetch_unique<T: Stored>(&self, id: &str) -> Option<&T> {
        T::table(self).get(id)
    }

    pub fn fetch_unique_mut<T: Stored>(&mut self, id: &str) -> Option<&mut T> {
        T::table_mut(self).get_mut(id)
    }

    /// Fetch every entity among `ids` that exists; missing ids are skipped.
    #[must_use]
    pub fn fetch_many<'a, T: Stored>(
        &'a self,
        ids: impl IntoIterator<Item = &'a str>,
    ) -> Vec<&'a T> {
        let table = T::table(self);
        ids.into_iter().filter_map(|id| table.get(id)).collect()
    }

    #[must_use]
    pub fn contains<T: Stored>(&self, id: &str) -> bool {
        T::table(self).contains_key(id)
    }

    pub fn all<T: Stored>(&self) -> impl Iterator<Item = &T> {
        T::table(self).values()
    }

    #[must_use]
    pub fn count<T: Stored>(&self) -> usize {
        T::table(self).len()
    }

    /// Entities of `T` owned by `user_id`.
    pub fn owned_by<'a, T>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a T>
    where
        T: Stored + Synchronizable,
    {
        self.all::<T>()
            .filter(move |entity| entity.owner_id() == Some(user_id))
    }

    /// Entities of `T` with local changes not yet pushed outward.
    pub fn dirty<T>(&self) -> impl Iterator<Item = &T>
    where
        T: Stored + Synchronizable,
    {
        self.all::<T>().filter(|entity| entity.is_dirty())
    }

    // ==================
    // Mutation
    // ==================

    /// Insert or replace an entity. Visible to lookups immediately.
    pub fn insert<T: Stored>(&mut self, entity: T) {
        let id = entity.stored_id().to_string();
        self.pending_deletes.remove(&(T::STORED_KIND, id.clone()));
        T::table_mut(self).insert(id, entity);
    }

    /// Hard-delete an entity, cascading to what it owns.
    ///
    /// - Meal → its companion todo item
    /// - ShoppingListItem → its companion todo item
    /// - TodoItem → its events
    ///
    /// Returns `false` if nothing with that id existed.
    pub fn delete(&mut self, kind: EntityKind, id: &str) -> bool {
        let owned: Option<Vec<(EntityKind, String)>> = match kind {
            EntityKind::User => self.remove_row::<User>(id).map(|_| Vec::new()),
            EntityKind::Recipe => self.remove_row::<Recipe>(id).map(|_| Vec::new()),
            EntityKind::TodoItemCategory => {
                self.remove_row::<TodoItemCategory>(id).map(|_| Vec::new())
            }
            EntityKind::TodoItemEvent => self.remove_row::<TodoItemEvent>(id).map(|_| Vec::new()),
            EntityKind::Space => self.remove_row::<Space>(id).map(|_| Vec::new()),
            EntityKind::TodoItem => self.remove_row::<TodoItem>(id).map(|item| {
                item.event_ids
                    .into_iter()
                    .map(|event| (EntityKind::TodoItemEvent, event))
                    .collect()
            }),
            EntityKind::Meal => self.remove_row::<Meal>(id).map(|meal| {
                meal.todo_item_id
                    .into_iter()
                    .map(|todo| (EntityKind::TodoItem, todo))
                    .collect()
            }),
            EntityKind::ShoppingListItem => {
                self.remove_row::<ShoppingListItem>(id).map(|item| {
                    item.todo_item_id
                        .into_iter()
                        .map(|todo| (EntityKind::TodoItem, todo))
                        .collect()
                })
            }
        };

        let Some(owned) = owned else {
            debug!(kind = %kind, id, "delete of unknown entity ignored");
            return false;
        };
        for (owned_kind, owned_id) in owned {
            debug!(kind = %owned_kind, id = %owned_id, "cascade delete");
            self.delete(owned_kind, &owned_id);
        }
        true
    }

    fn remove_row<T: Stored>(&mut self, id: &str) -> Option<T> {
        let removed = T::table_mut(self).remove(id)?;
        self.pending_deletes.insert((T::STORED_KIND, id.to_string()));
        Some(removed)
    }

    // ==================
    // Categories
    // ==================

    #[must_use]
    pub fn category_by_name(&self, name: &str) -> Option<&TodoItemCategory> {
        let name = name.trim();
        self.categories.values().find(|category| category.name == name)
    }

    /// Category resolver: existing category by trimmed name, or a new one.
    ///
    /// Returns `None` for an empty or whitespace-only name.
    pub fn fetch_or_create_category(&mut self, name: &str) -> Option<&TodoItemCategory> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let id = match self.category_by_name(name) {
            Some(existing) => existing.id.clone(),
            None => {
                let category = TodoItemCategory::new(name);
                let id = category.id.clone();
                debug!(category = name, id = %id, "category created");
                self.insert(category);
                id
            }
        };
        self.categories.get(&id)
    }

    // ==================
    // Persistence
    // ==================

    /// Persist every changed and deleted row.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails. Nothing
    /// is marked persisted then, so the next save retries the same rows.
    pub fn save(&mut self) -> Result<SaveStats> {
        let mut upserts = Vec::new();
        self.collect_changed::<User>(&mut upserts)?;
        self.collect_changed::<Recipe>(&mut upserts)?;
        self.collect_changed::<TodoItemCategory>(&mut upserts)?;
        self.collect_changed::<TodoItem>(&mut upserts)?;
        self.collect_changed::<TodoItemEvent>(&mut upserts)?;
        self.collect_changed::<Meal>(&mut upserts)?;
        self.collect_changed::<ShoppingListItem>(&mut upserts)?;
        self.collect_changed::<Space>(&mut upserts)?;

        let deletes: Vec<(EntityKind, String)> = self
            .pending_deletes
            .iter()
            .filter(|key| self.persisted.contains_key(*key))
            .cloned()
            .collect();

        let stats = SaveStats {
            upserted: upserts.len(),
            deleted: deletes.len(),
        };
        if !stats.is_empty() {
            self.backend.write(&upserts, &deletes)?;
        }

        for row in upserts {
            self.persisted.insert((row.kind, row.id), row.content_hash);
        }
        for key in &deletes {
            self.persisted.remove(key);
        }
        self.pending_deletes.clear();

        debug!(upserted = stats.upserted, deleted = stats.deleted, "store saved");
        Ok(stats)
    }

    fn collect_changed<T: Stored>(&self, out: &mut Vec<PersistedRow>) -> Result<()> {
        for (id, entity) in T::table(self) {
            let body = serde_json::to_string(entity)?;
            let content_hash = hash_str(&body);
            let key = (T::STORED_KIND, id.clone());
            if !has_changed(&content_hash, self.persisted.get(&key).map(String::as_str)) {
                continue;
            }
            out.push(PersistedRow {
                kind: T::STORED_KIND,
                id: id.clone(),
                body,
                content_hash,
            });
        }
        Ok(())
    }

    /// Totals and dirty counts per kind.
    #[must_use]
    pub fn status(&self) -> Vec<KindStatus> {
        fn synced<T: Stored + Synchronizable>(store: &EntityStore) -> KindStatus {
            KindStatus {
                kind: T::STORED_KIND,
                total: store.count::<T>(),
                dirty: Some(store.dirty::<T>().count()),
            }
        }

        vec![
            synced::<User>(self),
            synced::<Recipe>(self),
            KindStatus {
                kind: EntityKind::TodoItemCategory,
                total: self.count::<TodoItemCategory>(),
                dirty: None,
            },
            synced::<TodoItem>(self),
            synced::<TodoItemEvent>(self),
            synced::<Meal>(self),
            synced::<ShoppingListItem>(self),
            synced::<Space>(self),
        ]
    }
}
