use crate::{
    error::{EngineError, Operation},
    store::ThreadStore,
};
use skein_common::model::user::ProfileUpdate;
use tracing::debug;

const OP: Operation = Operation::UpdateProfile;

/// Idempotent upsert of a user's profile attributes. The handle arrives
/// already lowercase-normalized through the `UserHandle` type, and the store
/// marks the profile onboarded on every successful call.
#[derive(Clone, Debug)]
pub struct ProfileWriter<S> {
    store: S,
}

impl<S: ThreadStore> ProfileWriter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), EngineError> {
        debug!(user = %update.user_id, "upserting profile");

        self.store
            .upsert_profile(update)
            .await
            .map_err(|source| EngineError::write(OP, source))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        profile::ProfileWriter,
        store::{MemoryStore, ThreadStore},
    };
    use skein_common::model::user::{ProfileUpdate, UserHandle};

    fn update(handle: &str, name: &str) -> ProfileUpdate {
        ProfileUpdate {
            user_id: "u1".into(),
            handle: UserHandle::new(handle).unwrap(),
            name: name.to_owned(),
            bio: "hello".to_owned(),
            avatar: "u1.png".to_owned(),
        }
    }

    #[tokio::test]
    async fn upsert_creates_with_normalized_handle() {
        let store = MemoryStore::new();
        let writer = ProfileWriter::new(store.clone());

        writer.update_profile(&update("Alice", "Alice")).await.unwrap();

        let stored = store.user_by_id(&"u1".into()).await.unwrap().unwrap();
        assert_eq!(stored.handle.get(), "alice");
        assert!(stored.onboarded);
    }

    #[tokio::test]
    async fn upsert_is_idempotent_and_overwrites() {
        let store = MemoryStore::new();
        let writer = ProfileWriter::new(store.clone());

        writer.update_profile(&update("Alice", "Alice")).await.unwrap();
        writer.update_profile(&update("ALICE", "Alice A.")).await.unwrap();

        let stored = store.user_by_id(&"u1".into()).await.unwrap().unwrap();
        assert_eq!(stored.handle.get(), "alice");
        assert_eq!(stored.name, "Alice A.");
        assert!(stored.onboarded);
    }

    #[tokio::test]
    async fn upsert_leaves_the_post_list_alone() {
        let store = MemoryStore::new();
        let writer = ProfileWriter::new(store.clone());
        writer.update_profile(&update("alice", "Alice")).await.unwrap();

        let mut stored = store.user_by_id(&"u1".into()).await.unwrap().unwrap();
        stored.post_ids.push("p1".into());
        store.insert_user(stored);

        writer.update_profile(&update("alice", "Alice")).await.unwrap();
        let stored = store.user_by_id(&"u1".into()).await.unwrap().unwrap();
        assert_eq!(stored.post_ids.len(), 1);
    }
}
