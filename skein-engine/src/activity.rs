use crate::{
    error::{EngineError, Entity, Operation},
    store::ThreadStore,
};
use skein_common::model::{
    Id,
    feed::{AuthorRef, Reply},
    post::PostMarker,
    user::UserMarker,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

const OP: Operation = Operation::Activity;

/// Collects the replies other users left on a user's posts.
#[derive(Clone, Debug)]
pub struct ActivityResolver<S> {
    store: S,
    dedup_replies: bool,
}

impl<S: ThreadStore> ActivityResolver<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            dedup_replies: false,
        }
    }

    /// Collapse duplicate child references before resolving them. Off by
    /// default: the stored child lists are taken as-is, so a reply listed
    /// under several of the user's posts appears once per listing.
    #[must_use]
    pub fn dedup_replies(mut self) -> Self {
        self.dedup_replies = true;
        self
    }

    /// Returns every reply authored by someone else on any post the user
    /// authored, with the reply author's identity attached. Self-replies are
    /// excluded. Order follows the stored post and child lists.
    pub async fn activity(&self, user_id: &Id<UserMarker>) -> Result<Vec<Reply>, EngineError> {
        debug!(user = %user_id, "resolving activity");

        let authored = self
            .store
            .posts_by_author(user_id)
            .await
            .map_err(|source| EngineError::query(OP, source))?;

        let mut child_ids: Vec<Id<PostMarker>> = authored
            .iter()
            .flat_map(|post| post.child_ids.iter().cloned())
            .collect();
        if self.dedup_replies {
            let mut seen = HashSet::new();
            child_ids.retain(|id| seen.insert(id.clone()));
        }

        let fetched = self
            .store
            .posts_by_ids(&child_ids)
            .await
            .map_err(|source| EngineError::query(OP, source))?;
        let replies: HashMap<_, _> = fetched
            .into_iter()
            .map(|post| (post.id.clone(), post))
            .collect();
        if let Some(missing) = child_ids.iter().find(|id| !replies.contains_key(*id)) {
            return Err(EngineError::not_found(OP, Entity::Post, missing.get()));
        }

        let kept: Vec<_> = child_ids
            .iter()
            .map(|id| &replies[id])
            .filter(|reply| reply.author_id != *user_id)
            .collect();

        let author_ids: Vec<Id<UserMarker>> = kept
            .iter()
            .map(|reply| reply.author_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let authors = self
            .store
            .users_by_ids(&author_ids)
            .await
            .map_err(|source| EngineError::query(OP, source))?;
        let authors: HashMap<_, _> = authors
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();
        if let Some(missing) = author_ids.iter().find(|id| !authors.contains_key(*id)) {
            return Err(EngineError::not_found(OP, Entity::User, missing.get()));
        }

        Ok(kept
            .into_iter()
            .map(|reply| Reply {
                id: reply.id.clone(),
                body: reply.body.clone(),
                parent_id: reply.parent_id.clone(),
                created_at: reply.created_at,
                author: AuthorRef::from(&authors[&reply.author_id]),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::{activity::ActivityResolver, store::MemoryStore};
    use skein_common::model::{
        post::Post,
        user::{User, UserHandle},
    };
    use time::macros::utc_datetime;

    fn user(id: &str, name: &str) -> User {
        User {
            id: id.into(),
            handle: UserHandle::new(id).unwrap(),
            name: name.to_owned(),
            bio: String::new(),
            avatar: format!("{id}.png"),
            onboarded: true,
            created_at: utc_datetime!(2025-06-01 12:00),
            post_ids: Vec::new(),
        }
    }

    fn post(id: &str, author: &str, parent: Option<&str>) -> Post {
        Post {
            id: id.into(),
            body: format!("body of {id}"),
            parent_id: parent.map(Into::into),
            author_id: author.into(),
            community_id: None,
            created_at: utc_datetime!(2025-06-01 12:00),
            child_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn excludes_self_replies() {
        let store = MemoryStore::new();
        store.insert_user(user("a", "Alice"));
        store.insert_user(user("b", "Bob"));
        store.insert_post(post("p1", "a", None));
        store.insert_post(post("c1", "b", Some("p1")));
        store.insert_post(post("c2", "a", Some("p1")));

        let resolver = ActivityResolver::new(store);
        let replies = resolver.activity(&"a".into()).await.unwrap();

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].id, "c1".into());
        assert_eq!(replies[0].parent_id, Some("p1".into()));
        assert_eq!(replies[0].author.id, "b".into());
        assert_eq!(replies[0].author.name, "Bob");
        assert_eq!(replies[0].author.avatar, "b.png");
    }

    #[tokio::test]
    async fn no_posts_means_no_activity() {
        let store = MemoryStore::new();
        store.insert_user(user("a", "Alice"));

        let resolver = ActivityResolver::new(store);
        assert!(resolver.activity(&"a".into()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn collects_replies_across_all_authored_posts() {
        let store = MemoryStore::new();
        store.insert_user(user("a", "Alice"));
        store.insert_user(user("b", "Bob"));
        store.insert_user(user("c", "Carol"));
        store.insert_post(post("p1", "a", None));
        store.insert_post(post("p2", "a", None));
        store.insert_post(post("c1", "b", Some("p1")));
        store.insert_post(post("c2", "c", Some("p2")));

        let resolver = ActivityResolver::new(store);
        let replies = resolver.activity(&"a".into()).await.unwrap();

        let ids: Vec<_> = replies.iter().map(|r| r.id.get().to_owned()).collect();
        assert_eq!(ids, ["c1", "c2"]);
    }

    #[tokio::test]
    async fn duplicate_child_references_are_kept_unless_deduplicated() {
        let store = MemoryStore::new();
        store.insert_user(user("a", "Alice"));
        store.insert_user(user("b", "Bob"));
        // The reply is listed twice under the same parent; the stored lists
        // are taken at face value.
        store.insert_post(post("c1", "b", None));
        let mut p1 = post("p1", "a", None);
        p1.child_ids = vec!["c1".into(), "c1".into()];
        store.insert_post(p1);

        let resolver = ActivityResolver::new(store.clone());
        assert_eq!(resolver.activity(&"a".into()).await.unwrap().len(), 2);

        let resolver = ActivityResolver::new(store).dedup_replies();
        assert_eq!(resolver.activity(&"a".into()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn replies_by_the_user_on_other_posts_do_not_count() {
        let store = MemoryStore::new();
        store.insert_user(user("a", "Alice"));
        store.insert_user(user("b", "Bob"));
        store.insert_post(post("p1", "b", None));
        store.insert_post(post("c1", "a", Some("p1")));

        let resolver = ActivityResolver::new(store);
        assert!(resolver.activity(&"a".into()).await.unwrap().is_empty());
    }
}
