use crate::{
    error::{EngineError, Entity, Operation},
    store::ThreadStore,
};
use skein_common::model::{
    Id,
    feed::{AuthorRef, CommunityRef, Feed, FeedPost, ProfileId, ProfileRef},
    post::{Post, PostMarker},
    user::{User, UserMarker},
};
use std::collections::HashMap;
use tracing::debug;

const OP: Operation = Operation::ProfileFeed;

/// Assembles a profile's denormalized feed from the normalized records.
///
/// Resolution is a bounded two-hop join: the profile's top-level posts, each
/// post's immediate children, and each child's author. It never recurses
/// deeper, and it either resolves fully or fails.
#[derive(Clone, Debug)]
pub struct PostAggregator<S> {
    store: S,
}

impl<S: ThreadStore> PostAggregator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the profile's complete feed of top-level posts, each carrying
    /// its resolved author, its resolved community reference and the avatars
    /// of its immediate replies' authors.
    ///
    /// For user profiles every post is attributed to the profile itself; for
    /// community profiles each post keeps its own stored author. The whole
    /// post set is returned unpaginated.
    pub async fn profile_feed(
        &self,
        profile: &ProfileId,
        viewer: &Id<UserMarker>,
    ) -> Result<Feed, EngineError> {
        debug!(%viewer, "assembling profile feed");

        let (profile_ref, post_ids) = match profile {
            ProfileId::User(id) => {
                let user = self
                    .store
                    .user_by_id(id)
                    .await
                    .map_err(|source| EngineError::query(OP, source))?
                    .ok_or_else(|| EngineError::not_found(OP, Entity::User, id.get()))?;
                (ProfileRef::User(AuthorRef::from(&user)), user.post_ids)
            }
            ProfileId::Community(id) => {
                let community = self
                    .store
                    .community_by_id(id)
                    .await
                    .map_err(|source| EngineError::query(OP, source))?
                    .ok_or_else(|| EngineError::not_found(OP, Entity::Community, id.get()))?;
                (
                    ProfileRef::Community(CommunityRef::from(&community)),
                    community.post_ids,
                )
            }
        };

        let owned = self.posts_map(&post_ids).await?;
        let top_posts: Vec<&Post> = post_ids
            .iter()
            .map(|id| &owned[id])
            .filter(|post| post.is_top_level())
            .collect();

        // First hop: the immediate children of every top-level post.
        let child_ids: Vec<Id<PostMarker>> = top_posts
            .iter()
            .flat_map(|post| post.child_ids.iter().cloned())
            .collect();
        let children = self.posts_map(&child_ids).await?;

        // Second hop: the children's authors, plus the posts' own authors
        // when attribution is record-driven.
        let mut author_ids: Vec<Id<UserMarker>> = children
            .values()
            .map(|child| child.author_id.clone())
            .collect();
        if matches!(profile_ref, ProfileRef::Community(_)) {
            author_ids.extend(top_posts.iter().map(|post| post.author_id.clone()));
        }
        let authors = self.users_map(&author_ids).await?;

        let community_ids: Vec<_> = top_posts
            .iter()
            .filter_map(|post| post.community_id.clone())
            .collect();
        let communities = self
            .store
            .communities_by_ids(&community_ids)
            .await
            .map_err(|source| EngineError::query(OP, source))?;
        let communities: HashMap<_, _> = communities
            .into_iter()
            .map(|community| (community.id.clone(), community))
            .collect();

        let mut posts = Vec::with_capacity(top_posts.len());
        for post in top_posts {
            let author = match &profile_ref {
                ProfileRef::User(profile_author) => profile_author.clone(),
                ProfileRef::Community(_) => AuthorRef::from(&authors[&post.author_id]),
            };
            let community = match &post.community_id {
                Some(id) => Some(CommunityRef::from(communities.get(id).ok_or_else(
                    || EngineError::not_found(OP, Entity::Community, id.get()),
                )?)),
                None => None,
            };
            let reply_avatars = post
                .child_ids
                .iter()
                .map(|child_id| authors[&children[child_id].author_id].avatar.clone())
                .collect();

            posts.push(FeedPost {
                id: post.id.clone(),
                body: post.body.clone(),
                parent_id: post.parent_id.clone(),
                author,
                community,
                created_at: post.created_at,
                reply_avatars,
            });
        }

        Ok(Feed {
            profile: profile_ref,
            posts,
        })
    }

    /// Resolves post ids to records, failing on any dangling reference.
    async fn posts_map(
        &self,
        ids: &[Id<PostMarker>],
    ) -> Result<HashMap<Id<PostMarker>, Post>, EngineError> {
        let posts = self
            .store
            .posts_by_ids(ids)
            .await
            .map_err(|source| EngineError::query(OP, source))?;
        let map: HashMap<_, _> = posts.into_iter().map(|post| (post.id.clone(), post)).collect();
        if let Some(missing) = ids.iter().find(|id| !map.contains_key(*id)) {
            return Err(EngineError::not_found(OP, Entity::Post, missing.get()));
        }
        Ok(map)
    }

    async fn users_map(
        &self,
        ids: &[Id<UserMarker>],
    ) -> Result<HashMap<Id<UserMarker>, User>, EngineError> {
        let users = self
            .store
            .users_by_ids(ids)
            .await
            .map_err(|source| EngineError::query(OP, source))?;
        let map: HashMap<_, _> = users.into_iter().map(|user| (user.id.clone(), user)).collect();
        if let Some(missing) = ids.iter().find(|id| !map.contains_key(*id)) {
            return Err(EngineError::not_found(OP, Entity::User, missing.get()));
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        aggregate::PostAggregator,
        error::{EngineError, ErrorKind},
        store::MemoryStore,
    };
    use skein_common::model::{
        community::Community,
        feed::{AuthorRef, ProfileId, ProfileRef},
        post::Post,
        user::{User, UserHandle},
    };
    use time::{UtcDateTime, macros::utc_datetime};

    const T0: UtcDateTime = utc_datetime!(2025-06-01 12:00);

    fn user(id: &str, name: &str, avatar: &str) -> User {
        User {
            id: id.into(),
            handle: UserHandle::new(id).unwrap(),
            name: name.to_owned(),
            bio: String::new(),
            avatar: avatar.to_owned(),
            onboarded: true,
            created_at: T0,
            post_ids: Vec::new(),
        }
    }

    fn community(id: &str, name: &str, avatar: &str) -> Community {
        Community {
            id: id.into(),
            name: name.to_owned(),
            avatar: avatar.to_owned(),
            created_at: T0,
            post_ids: Vec::new(),
        }
    }

    fn post(id: &str, author: &str, body: &str) -> Post {
        Post {
            id: id.into(),
            body: body.to_owned(),
            parent_id: None,
            author_id: author.into(),
            community_id: None,
            created_at: T0,
            child_ids: Vec::new(),
        }
    }

    fn reply(id: &str, author: &str, parent: &str) -> Post {
        Post {
            parent_id: Some(parent.into()),
            ..post(id, author, "a reply")
        }
    }

    #[tokio::test]
    async fn empty_profile_yields_empty_feed() {
        let store = MemoryStore::new();
        store.insert_user(user("alice", "Alice", "alice.png"));

        let aggregator = PostAggregator::new(store);
        let feed = aggregator
            .profile_feed(&ProfileId::User("alice".into()), &"viewer".into())
            .await
            .unwrap();

        assert!(feed.posts.is_empty());
        assert_eq!(
            feed.profile,
            ProfileRef::User(AuthorRef {
                id: "alice".into(),
                name: "Alice".to_owned(),
                avatar: "alice.png".to_owned(),
            })
        );
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let aggregator = PostAggregator::new(MemoryStore::new());

        let err = aggregator
            .profile_feed(&ProfileId::User("ghost".into()), &"viewer".into())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = aggregator
            .profile_feed(&ProfileId::Community("nowhere".into()), &"viewer".into())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn user_feed_is_attributed_to_the_profile() {
        let store = MemoryStore::new();
        let mut alice = user("alice", "Alice", "alice.png");
        // The stored author field deliberately disagrees with the owning
        // profile: feed identity must stay profile-driven.
        alice.post_ids.push("p1".into());
        store.insert_user(alice);
        store.insert_user(user("bob", "Bob", "bob.png"));
        store.insert_post(post("p1", "bob", "written under bob's name"));

        let aggregator = PostAggregator::new(store);
        let feed = aggregator
            .profile_feed(&ProfileId::User("alice".into()), &"viewer".into())
            .await
            .unwrap();

        assert_eq!(feed.posts.len(), 1);
        assert_eq!(feed.posts[0].author.id, "alice".into());
        assert_eq!(feed.posts[0].author.name, "Alice");
    }

    #[tokio::test]
    async fn community_feed_keeps_stored_authors() {
        let store = MemoryStore::new();
        store.insert_user(user("bob", "Bob", "bob.png"));
        store.insert_user(user("carol", "Carol", "carol.png"));
        store.insert_community(community("rustaceans", "Rustaceans", "crab.png"));

        let mut p1 = post("p1", "bob", "first");
        p1.community_id = Some("rustaceans".into());
        store.insert_post(p1);
        let mut p2 = post("p2", "carol", "second");
        p2.community_id = Some("rustaceans".into());
        store.insert_post(p2);

        let aggregator = PostAggregator::new(store);
        let feed = aggregator
            .profile_feed(&ProfileId::Community("rustaceans".into()), &"viewer".into())
            .await
            .unwrap();

        assert_eq!(feed.posts.len(), 2);
        assert_eq!(feed.posts[0].author.name, "Bob");
        assert_eq!(feed.posts[1].author.name, "Carol");

        let community_ref = feed.posts[0].community.as_ref().unwrap();
        assert_eq!(community_ref.id, "rustaceans".into());
        assert_eq!(community_ref.name, "Rustaceans");
        assert_eq!(community_ref.avatar, "crab.png");
    }

    #[tokio::test]
    async fn reply_avatars_follow_child_order() {
        let store = MemoryStore::new();
        store.insert_user(user("alice", "Alice", "alice.png"));
        store.insert_user(user("bob", "Bob", "bob.png"));
        store.insert_user(user("carol", "Carol", "carol.png"));
        store.insert_post(post("p1", "alice", "hello"));
        store.insert_post(reply("c1", "bob", "p1"));
        store.insert_post(reply("c2", "carol", "p1"));

        let aggregator = PostAggregator::new(store);
        let feed = aggregator
            .profile_feed(&ProfileId::User("alice".into()), &"viewer".into())
            .await
            .unwrap();

        assert_eq!(feed.posts.len(), 1);
        assert_eq!(feed.posts[0].reply_avatars, vec!["bob.png", "carol.png"]);
        assert_eq!(feed.posts[0].community, None);
    }

    #[tokio::test]
    async fn replies_are_not_top_level_feed_entries() {
        let store = MemoryStore::new();
        store.insert_user(user("alice", "Alice", "alice.png"));
        store.insert_user(user("bob", "Bob", "bob.png"));
        store.insert_post(post("p1", "bob", "bob's post"));
        // Alice's own reply lands in her post list but not in her feed.
        store.insert_post(reply("c1", "alice", "p1"));

        let aggregator = PostAggregator::new(store);
        let feed = aggregator
            .profile_feed(&ProfileId::User("alice".into()), &"viewer".into())
            .await
            .unwrap();

        assert!(feed.posts.is_empty());
    }

    #[tokio::test]
    async fn dangling_child_reference_fails_whole_aggregation() {
        let store = MemoryStore::new();
        store.insert_user(user("alice", "Alice", "alice.png"));
        let mut p1 = post("p1", "alice", "hello");
        p1.child_ids.push("vanished".into());
        store.insert_post(p1);

        let aggregator = PostAggregator::new(store);
        let err = aggregator
            .profile_feed(&ProfileId::User("alice".into()), &"viewer".into())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(matches!(err, EngineError::NotFound { id, .. } if id == "vanished"));
    }
}
