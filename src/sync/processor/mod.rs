//! Per-kind entity processors.
//!
//! A processor applies one batch of remote records of its kind to the
//! store. Every record goes through the same steps:
//!
//! 1. decode the field map into the kind's typed record and require a `uid`
//! 2. fetch the entity, or create a clean one if the mandatory fields are
//!    present (inserted right away so later records can resolve it)
//! 3. apply present scalar fields
//! 4. resolve singular references, keeping the old value when the target is
//!    unknown locally
//! 5. reconcile list references as set differences
//! 6. mark the entity synced
//!
//! Problems with one record are collected as [`RecordIssue`]s and never stop
//! the batch.

mod meal;
mod recipe;
mod shopping;
mod todo;
mod user;

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::model::EntityKind;
use crate::storage::{EntityStore, Stored};
use crate::sync::records::{raw_uid, Record};
use crate::sync::types::{ProcessingReport, RecordIssue};

pub use meal::MealProcessor;
pub use recipe::RecipeProcessor;
pub use shopping::ShoppingListItemProcessor;
pub use todo::TodoItemProcessor;
pub use user::UserProcessor;

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Created,
    Updated,
    Skipped,
}

/// Applies remote records of one kind to the store.
pub trait Processor {
    const KIND: EntityKind;

    type Record: Record + DeserializeOwned;

    /// Apply one decoded record whose `uid` is known to be non-empty.
    fn apply(
        &self,
        store: &mut EntityStore,
        record: Self::Record,
        ctx: &mut RecordContext<'_>,
    ) -> Applied;

    /// Apply a whole batch of raw field maps.
    fn process(&self, store: &mut EntityStore, batch: Vec<Value>) -> ProcessingReport {
        let mut report = ProcessingReport::new(Self::KIND);

        for (index, value) in batch.into_iter().enumerate() {
            let fallback_uid = raw_uid(&value);
            let record: Self::Record = match serde_json::from_value(value) {
                Ok(record) => record,
                Err(err) => {
                    let issue = RecordIssue::Malformed {
                        index,
                        uid: fallback_uid,
                        message: err.to_string(),
                    };
                    warn!(kind = %Self::KIND, "{issue}");
                    report.issues.push(issue);
                    report.stats.skipped += 1;
                    continue;
                }
            };

            let Some(uid) = record.uid().map(ToString::to_string) else {
                let issue = RecordIssue::MissingId { index };
                warn!(kind = %Self::KIND, "{issue}");
                report.issues.push(issue);
                report.stats.skipped += 1;
                continue;
            };

            let mut ctx = RecordContext {
                index,
                uid: &uid,
                report: &mut report,
            };
            let applied = self.apply(store, record, &mut ctx);
            debug!(kind = %Self::KIND, uid = %uid, ?applied, "record processed");

            match applied {
                Applied::Created => report.stats.created += 1,
                Applied::Updated => report.stats.updated += 1,
                Applied::Skipped => report.stats.skipped += 1,
            }
        }

        info!(
            kind = %Self::KIND,
            created = report.stats.created,
            updated = report.stats.updated,
            skipped = report.stats.skipped,
            issues = report.issues.len(),
            "batch processed"
        );
        report
    }
}

/// Per-record view of the batch report, with the reference helpers.
#[derive(Debug)]
pub struct RecordContext<'r> {
    index: usize,
    uid: &'r str,
    report: &'r mut ProcessingReport,
}

impl<'r> RecordContext<'r> {
    #[must_use]
    pub fn uid(&self) -> &'r str {
        self.uid
    }

    fn push(&mut self, issue: RecordIssue) {
        warn!(kind = %self.report.kind, "{issue}");
        self.report.issues.push(issue);
    }

    /// Report a mandatory field missing on creation; the record is skipped.
    pub fn missing_field(&mut self, field: &'static str) -> Applied {
        self.push(RecordIssue::MissingField {
            uid: self.uid.to_string(),
            field,
        });
        Applied::Skipped
    }

    /// Report a record that cannot be applied at all; it is skipped.
    pub fn malformed(&mut self, message: impl Into<String>) -> Applied {
        self.push(RecordIssue::Malformed {
            index: self.index,
            uid: Some(self.uid.to_string()),
            message: message.into(),
        });
        Applied::Skipped
    }

    /// Report an unusable field value; the field is left unchanged.
    pub fn invalid_field(&mut self, field: &'static str, message: impl Into<String>) {
        self.push(RecordIssue::InvalidField {
            uid: self.uid.to_string(),
            field,
            message: message.into(),
        });
    }

    fn dangling(&mut self, field: &'static str, target: &str) {
        self.push(RecordIssue::DanglingReference {
            uid: self.uid.to_string(),
            field,
            target: target.to_string(),
        });
    }

    /// Resolve a singular reference field.
    ///
    /// Returns the reference the entity should hold afterwards:
    /// - omitted (or blank): `None`, clearing any current reference
    /// - equal to the current reference: unchanged
    /// - found in the store: the new id
    /// - unknown: the current reference, with a dangling-reference issue
    pub fn resolve<T: Stored>(
        &mut self,
        store: &EntityStore,
        field: &'static str,
        current: Option<&str>,
        supplied: Option<&str>,
    ) -> Option<String> {
        let supplied = supplied.map(str::trim).filter(|target| !target.is_empty());
        match supplied {
            None => {
                if let Some(previous) = current {
                    debug!(uid = self.uid, field, previous, "reference cleared");
                }
                None
            }
            Some(target) if current == Some(target) => Some(target.to_string()),
            Some(target) if store.contains::<T>(target) => Some(target.to_string()),
            Some(target) => {
                self.dangling(field, target);
                current.map(ToString::to_string)
            }
        }
    }

    /// Reconcile a list reference against the supplied target ids.
    ///
    /// Ids in `current` but not in `target` are removed; ids in `target` but
    /// not in `current` are looked up in one pass and appended when found.
    /// Returns `None` when the list does not change.
    pub fn reconcile<T: Stored>(
        &mut self,
        store: &EntityStore,
        field: &'static str,
        current: &[String],
        target: &[String],
    ) -> Option<Vec<String>> {
        let target_set: BTreeSet<&str> = target.iter().map(String::as_str).collect();
        let current_set: BTreeSet<&str> = current.iter().map(String::as_str).collect();
        if target_set == current_set {
            return None;
        }

        let mut next: Vec<String> = current
            .iter()
            .filter(|id| target_set.contains(id.as_str()))
            .cloned()
            .collect();

        let to_add: Vec<&str> = target_set.difference(&current_set).copied().collect();
        let found: BTreeSet<String> = store
            .fetch_many::<T>(to_add.iter().copied())
            .into_iter()
            .map(|entity| entity.stored_id().to_string())
            .collect();

        for id in to_add {
            if found.contains(id) {
                next.push(id.to_string());
            } else {
                self.dangling(field, id);
            }
        }

        (next.as_slice() != current).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Meal;
    use crate::model::MealType;
    use proptest::prelude::*;

    fn store_with_meals(ids: &[&str]) -> (EntityStore, Vec<String>) {
        let mut store = EntityStore::in_memory();
        let mut created = Vec::new();
        for _ in ids {
            let meal = Meal::new("u1", MealType::Lunch, 1.0);
            created.push(meal.id.clone());
            store.insert(meal);
        }
        (store, created)
    }

    fn with_ctx<R>(f: impl FnOnce(&mut RecordContext<'_>) -> R) -> (R, ProcessingReport) {
        let mut report = ProcessingReport::new(EntityKind::Recipe);
        let mut ctx = RecordContext {
            index: 0,
            uid: "r1",
            report: &mut report,
        };
        let out = f(&mut ctx);
        (out, report)
    }

    #[test]
    fn test_resolve_found_replaces() {
        let (store, ids) = store_with_meals(&["a"]);
        let (resolved, report) =
            with_ctx(|ctx| ctx.resolve::<Meal>(&store, "mealId", Some("old"), Some(&ids[0])));
        assert_eq!(resolved.as_deref(), Some(ids[0].as_str()));
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_resolve_unknown_keeps_current() {
        let store = EntityStore::in_memory();
        let (resolved, report) =
            with_ctx(|ctx| ctx.resolve::<Meal>(&store, "mealId", Some("old"), Some("missing")));
        assert_eq!(resolved.as_deref(), Some("old"));
        assert_eq!(report.dangling().count(), 1);
    }

    #[test]
    fn test_resolve_omitted_clears() {
        let store = EntityStore::in_memory();
        let (resolved, report) =
            with_ctx(|ctx| ctx.resolve::<Meal>(&store, "mealId", Some("old"), None));
        assert_eq!(resolved, None);
        assert!(report.issues.is_empty());

        let (resolved, _) =
            with_ctx(|ctx| ctx.resolve::<Meal>(&store, "mealId", Some("old"), Some("  ")));
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_resolve_same_value_needs_no_lookup() {
        // The current target may have been deleted locally; an unchanged
        // reference is kept without reporting it.
        let store = EntityStore::in_memory();
        let (resolved, report) =
            with_ctx(|ctx| ctx.resolve::<Meal>(&store, "mealId", Some("m1"), Some("m1")));
        assert_eq!(resolved.as_deref(), Some("m1"));
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_reconcile_equal_sets_is_noop() {
        let (store, ids) = store_with_meals(&["a", "b"]);
        let reversed: Vec<String> = ids.iter().rev().cloned().collect();
        let (next, _) = with_ctx(|ctx| ctx.reconcile::<Meal>(&store, "mealIds", &ids, &reversed));
        assert_eq!(next, None);
    }

    #[test]
    fn test_reconcile_adds_removes_and_reports_missing() {
        let (store, ids) = store_with_meals(&["a", "b"]);
        let current = vec![ids[0].clone(), "gone".to_string()];
        let target = vec![ids[0].clone(), ids[1].clone(), "ghost".to_string()];

        let (next, report) =
            with_ctx(|ctx| ctx.reconcile::<Meal>(&store, "mealIds", &current, &target));

        assert_eq!(next, Some(vec![ids[0].clone(), ids[1].clone()]));
        let dangling: Vec<_> = report.dangling().collect();
        assert_eq!(dangling.len(), 1);
        assert!(matches!(
            dangling[0],
            RecordIssue::DanglingReference { target, .. } if target == "ghost"
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

        #[test]
        fn prop_reconcile_reaches_target_set(
            current_mask in prop::collection::vec(any::<bool>(), 6),
            target_mask in prop::collection::vec(any::<bool>(), 6),
            shuffle in any::<bool>(),
        ) {
            let (store, ids) = store_with_meals(&["a", "b", "c", "d", "e", "f"]);
            let pick = |mask: &[bool]| -> Vec<String> {
                ids.iter().zip(mask).filter(|(_, keep)| **keep).map(|(id, _)| id.clone()).collect()
            };
            let current = pick(&current_mask);
            let mut target = pick(&target_mask);
            if shuffle {
                target.reverse();
            }

            let (next, report) =
                with_ctx(|ctx| ctx.reconcile::<Meal>(&store, "mealIds", &current, &target));
            let result = next.unwrap_or_else(|| current.clone());

            let result_set: BTreeSet<&String> = result.iter().collect();
            let target_set: BTreeSet<&String> = target.iter().collect();
            prop_assert_eq!(result_set, target_set);
            prop_assert_eq!(result.len(), target.len());
            prop_assert!(report.issues.is_empty());
        }
    }
}
