use crate::store::{StoreError, ThreadStore};
use skein_common::model::{
    Id,
    community::{Community, CommunityMarker},
    directory::{SortOrder, UserFilter},
    post::{Post, PostMarker},
    user::{ProfileUpdate, User, UserMarker},
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use time::UtcDateTime;

/// In-process [`ThreadStore`] over locked hash maps. Backs the engine tests
/// and works as a store for single-process deployments.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Id<UserMarker>, User>,
    communities: HashMap<Id<CommunityMarker>, Community>,
    posts: HashMap<Id<PostMarker>, Post>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_user(&self, user: User) {
        self.lock().users.insert(user.id.clone(), user);
    }

    pub fn insert_community(&self, community: Community) {
        self.lock()
            .communities
            .insert(community.id.clone(), community);
    }

    /// Stores the post and links it into its parent's child list, its
    /// author's post list and its community's post list, keeping the
    /// reference lists bidirectionally consistent.
    pub fn insert_post(&self, post: Post) {
        let mut inner = self.lock();

        if let Some(parent_id) = &post.parent_id
            && let Some(parent) = inner.posts.get_mut(parent_id)
        {
            parent.child_ids.push(post.id.clone());
        }
        if let Some(author) = inner.users.get_mut(&post.author_id) {
            author.post_ids.push(post.id.clone());
        }
        if let Some(community_id) = &post.community_id
            && let Some(community) = inner.communities.get_mut(community_id)
        {
            community.post_ids.push(post.id.clone());
        }

        inner.posts.insert(post.id.clone(), post);
    }
}

fn matches(user: &User, filter: &UserFilter) -> bool {
    if filter.exclude.as_ref() == Some(&user.id) {
        return false;
    }
    match &filter.text {
        None => true,
        Some(text) => {
            let needle = text.to_lowercase();
            user.handle.get().contains(&needle) || user.name.to_lowercase().contains(&needle)
        }
    }
}

fn window(users: Vec<User>, filter: &UserFilter) -> Vec<User> {
    let skip = usize::try_from(filter.skip).unwrap_or(usize::MAX);
    let take = filter
        .limit
        .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
    users.into_iter().skip(skip).take(take).collect()
}

impl ThreadStore for MemoryStore {
    async fn user_by_id(&self, id: &Id<UserMarker>) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(id).cloned())
    }

    async fn community_by_id(
        &self,
        id: &Id<CommunityMarker>,
    ) -> Result<Option<Community>, StoreError> {
        Ok(self.lock().communities.get(id).cloned())
    }

    async fn users_by_ids(&self, ids: &[Id<UserMarker>]) -> Result<Vec<User>, StoreError> {
        let inner = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| inner.users.get(id).cloned())
            .collect())
    }

    async fn communities_by_ids(
        &self,
        ids: &[Id<CommunityMarker>],
    ) -> Result<Vec<Community>, StoreError> {
        let inner = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| inner.communities.get(id).cloned())
            .collect())
    }

    async fn posts_by_ids(&self, ids: &[Id<PostMarker>]) -> Result<Vec<Post>, StoreError> {
        let inner = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| inner.posts.get(id).cloned())
            .collect())
    }

    async fn posts_by_author(&self, author: &Id<UserMarker>) -> Result<Vec<Post>, StoreError> {
        let inner = self.lock();
        let Some(user) = inner.users.get(author) else {
            return Ok(Vec::new());
        };
        Ok(user
            .post_ids
            .iter()
            .filter_map(|id| inner.posts.get(id).cloned())
            .collect())
    }

    async fn find_users(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self
            .lock()
            .users
            .values()
            .filter(|user| matches(user, filter))
            .cloned()
            .collect();
        users.sort_by(|a, b| match filter.sort {
            SortOrder::Asc => a.created_at.cmp(&b.created_at),
            SortOrder::Desc => b.created_at.cmp(&a.created_at),
        });
        Ok(window(users, filter))
    }

    async fn count_users(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        let count = self
            .lock()
            .users
            .values()
            .filter(|user| matches(user, filter))
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn upsert_profile(&self, update: &ProfileUpdate) -> Result<(), StoreError> {
        let mut inner = self.lock();
        match inner.users.get_mut(&update.user_id) {
            Some(user) => {
                user.handle = update.handle.clone();
                user.name = update.name.clone();
                user.bio = update.bio.clone();
                user.avatar = update.avatar.clone();
                user.onboarded = true;
            }
            None => {
                inner.users.insert(
                    update.user_id.clone(),
                    User {
                        id: update.user_id.clone(),
                        handle: update.handle.clone(),
                        name: update.name.clone(),
                        bio: update.bio.clone(),
                        avatar: update.avatar.clone(),
                        onboarded: true,
                        created_at: UtcDateTime::now(),
                        post_ids: Vec::new(),
                    },
                );
            }
        }
        Ok(())
    }
}
