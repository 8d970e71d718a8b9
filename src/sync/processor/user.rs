use crate::model::{EntityKind, User};
use crate::storage::EntityStore;
use crate::sync::processor::{Applied, Processor, RecordContext};
use crate::sync::records::UserRecord;

/// Users have no mandatory fields and always own themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserProcessor;

impl Processor for UserProcessor {
    const KIND: EntityKind = EntityKind::User;

    type Record = UserRecord;

    fn apply(
        &self,
        store: &mut EntityStore,
        record: UserRecord,
        ctx: &mut RecordContext<'_>,
    ) -> Applied {
        let uid = ctx.uid();
        let (mut user, applied) = match store.fetch_unique::<User>(uid) {
            Some(existing) => (existing.clone(), Applied::Updated),
            None => {
                let user = User::from_remote(uid);
                store.insert(user.clone());
                (user, Applied::Created)
            }
        };

        if let Some(name) = record.name {
            user.name = Some(name);
        }

        if let Some(friend_ids) =
            ctx.reconcile::<User>(store, "friendIds", &user.friend_ids, &record.friend_ids)
        {
            user.friend_ids = friend_ids;
        }

        user.sync.mark_synced();
        store.insert(user);
        applied
    }
}
