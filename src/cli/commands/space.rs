//! Space command implementations.
//!
//! Every command that changes who sees what (membership, policy flags,
//! shared categories) recomputes space relationships for the affected
//! members before saving.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::SpaceCommands;
use crate::cli::commands::open_store;
use crate::config::resolve_user_id;
use crate::error::{Error, Result};
use crate::model::{SharePolicy, Space, Synchronizable, TodoItemCategory, User};
use crate::sharing::{update_for_users, RecomputeReport};
use crate::storage::EntityStore;

#[derive(Serialize)]
struct SpaceOutput<'a> {
    id: &'a str,
    name: &'a str,
    members: Vec<&'a str>,
    shared_categories: Vec<&'a str>,
    share_all_recipes: bool,
    share_all_meals: bool,
    share_all_shopping_items: bool,
    dirty: bool,
}

impl<'a> SpaceOutput<'a> {
    fn new(space: &'a Space, store: &'a EntityStore) -> Self {
        Self {
            id: space.id(),
            name: space.name(),
            members: space.member_ids().iter().map(String::as_str).collect(),
            shared_categories: store
                .fetch_many::<TodoItemCategory>(space.shared_category_ids().iter().map(String::as_str))
                .into_iter()
                .map(TodoItemCategory::name)
                .collect(),
            share_all_recipes: space.share_all_recipes(),
            share_all_meals: space.share_all_meals(),
            share_all_shopping_items: space.share_all_shopping_items(),
            dirty: space.is_dirty(),
        }
    }
}

/// Execute space commands.
///
/// # Errors
///
/// Returns an error if a referenced space, user or category is unknown, or
/// if the store cannot be saved.
pub fn execute(
    command: &SpaceCommands,
    acting_user: Option<&str>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let mut store = open_store(db_path)?;

    match command {
        SpaceCommands::Create { name } => create(&mut store, name, acting_user, json),
        SpaceCommands::AddMember { space, member } => {
            require_user(&store, member)?;
            let members = change_space(&mut store, space, |s| s.add_member(member))?;
            finish(&mut store, space, members, json)
        }
        SpaceCommands::RemoveMember { space, member } => {
            let mut members = change_space(&mut store, space, |s| s.remove_member(member))?;
            // The removed member's content must leave the space too.
            members.push(member.clone());
            finish(&mut store, space, members, json)
        }
        SpaceCommands::Policy { space, policy, off } => {
            let policy = SharePolicy::from(*policy);
            let members = change_space(&mut store, space, |s| s.set_policy(policy, !off))?;
            finish(&mut store, space, members, json)
        }
        SpaceCommands::ShareCategory { space, category } => {
            let category_id = store
                .fetch_or_create_category(category)
                .map(|c| c.id().to_string())
                .ok_or_else(|| Error::InvalidArgument("category name is empty".into()))?;
            let members = change_space(&mut store, space, |s| s.share_category(&category_id))?;
            finish(&mut store, space, members, json)
        }
        SpaceCommands::UnshareCategory { space, category } => {
            let category_id = store
                .category_by_name(category)
                .map(|c| c.id().to_string())
                .ok_or_else(|| Error::CategoryNotFound {
                    name: category.clone(),
                })?;
            let members = change_space(&mut store, space, |s| s.unshare_category(&category_id))?;
            finish(&mut store, space, members, json)
        }
        SpaceCommands::List => list(&store, json),
    }
}

fn require_user(store: &EntityStore, user_id: &str) -> Result<()> {
    if store.contains::<User>(user_id) {
        Ok(())
    } else {
        Err(Error::UserNotFound {
            id: user_id.to_string(),
        })
    }
}

/// Apply `change` to a space and return its members afterwards.
fn change_space<F>(store: &mut EntityStore, space_id: &str, change: F) -> Result<Vec<String>>
where
    F: FnOnce(&mut Space),
{
    let space = store
        .fetch_unique_mut::<Space>(space_id)
        .ok_or_else(|| Error::SpaceNotFound {
            id: space_id.to_string(),
        })?;
    change(space);
    Ok(space.member_ids().iter().cloned().collect())
}

fn create(store: &mut EntityStore, name: &str, acting_user: Option<&str>, json: bool) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidArgument("space name is empty".into()));
    }
    let owner = resolve_user_id(acting_user)?;
    require_user(store, &owner)?;

    let space = Space::new(&owner, name);
    let id = space.id().to_string();
    store.insert(space);
    store.save()?;
    let store: &EntityStore = store;

    if crate::is_silent() {
        println!("{id}");
    } else if json {
        if let Some(space) = store.fetch_unique::<Space>(&id) {
            println!("{}", serde_json::to_string(&SpaceOutput::new(space, store))?);
        }
    } else {
        println!("Created space: {name}");
        println!("  ID: {id}");
    }
    Ok(())
}

fn finish(store: &mut EntityStore, space_id: &str, members: Vec<String>, json: bool) -> Result<()> {
    let report: RecomputeReport = update_for_users(store, &members);
    store.save()?;
    let store: &EntityStore = store;

    if crate::is_silent() {
        println!("{space_id}");
    } else if json {
        let space = store
            .fetch_unique::<Space>(space_id)
            .map(|space| SpaceOutput::new(space, store));
        let output = serde_json::json!({
            "success": true,
            "space": space,
            "reshare": report,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Updated space: {space_id}");
        println!(
            "  Recomputed {} entities, {} changed",
            report.examined, report.changed
        );
    }
    Ok(())
}

fn list(store: &EntityStore, json: bool) -> Result<()> {
    let spaces: Vec<SpaceOutput<'_>> = store
        .all::<Space>()
        .map(|space| SpaceOutput::new(space, store))
        .collect();

    if json {
        println!("{}", serde_json::to_string(&spaces)?);
        return Ok(());
    }

    if spaces.is_empty() {
        println!("No spaces.");
        return Ok(());
    }
    for space in &spaces {
        println!("{}  {}", space.id, space.name);
        println!("  members: {}", space.members.join(", "));
        if !space.shared_categories.is_empty() {
            println!("  shared categories: {}", space.shared_categories.join(", "));
        }
        let mut flags = Vec::new();
        if space.share_all_recipes {
            flags.push("recipes");
        }
        if space.share_all_meals {
            flags.push("meals");
        }
        if space.share_all_shopping_items {
            flags.push("shopping-items");
        }
        if !flags.is_empty() {
            println!("  shares all: {}", flags.join(", "));
        }
    }
    Ok(())
}
