pub mod memory;

pub use memory::MemoryStore;

use skein_common::model::{
    Id,
    community::{Community, CommunityMarker},
    directory::UserFilter,
    post::{Post, PostMarker},
    user::{ProfileUpdate, User, UserMarker},
};
use thiserror::Error;

/// Opaque store-level failure. Implementations wrap their native errors;
/// the engine tags it with the failing operation.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct StoreError(Box<dyn std::error::Error + Send + Sync>);

impl StoreError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }
}

/// The relational store collaborator. Per-record reads and writes are atomic;
/// nothing here assumes multi-record transactions, and bidirectional
/// consistency of the parent/child and author/post reference lists is the
/// implementation's responsibility.
#[allow(async_fn_in_trait)]
pub trait ThreadStore: Send + Sync {
    async fn user_by_id(&self, id: &Id<UserMarker>) -> Result<Option<User>, StoreError>;

    async fn community_by_id(
        &self,
        id: &Id<CommunityMarker>,
    ) -> Result<Option<Community>, StoreError>;

    /// Resolves the given ids to user records. Absent ids are simply not
    /// returned; result order is unspecified.
    async fn users_by_ids(&self, ids: &[Id<UserMarker>]) -> Result<Vec<User>, StoreError>;

    async fn communities_by_ids(
        &self,
        ids: &[Id<CommunityMarker>],
    ) -> Result<Vec<Community>, StoreError>;

    /// Resolves the given ids to post records. Absent ids are simply not
    /// returned; result order is unspecified.
    async fn posts_by_ids(&self, ids: &[Id<PostMarker>]) -> Result<Vec<Post>, StoreError>;

    /// All posts authored by the user, replies included, insertion order.
    async fn posts_by_author(&self, author: &Id<UserMarker>) -> Result<Vec<Post>, StoreError>;

    /// Users matching the filter, sorted by creation time in the filter's
    /// direction, windowed by its skip/limit.
    async fn find_users(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError>;

    /// Total count of users matching the filter, ignoring its sort, skip
    /// and limit.
    async fn count_users(&self, filter: &UserFilter) -> Result<u64, StoreError>;

    /// Creates the user if absent, otherwise overwrites the listed profile
    /// fields. Sets the onboarded flag either way and leaves the authored
    /// post list untouched.
    async fn upsert_profile(&self, update: &ProfileUpdate) -> Result<(), StoreError>;
}
