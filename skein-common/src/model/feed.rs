use crate::model::{
    Id,
    community::{Community, CommunityMarker},
    post::PostMarker,
    user::{User, UserMarker},
};
use serde::{Deserialize, Serialize};
use time::UtcDateTime;

/// The profile a feed is assembled for. Carrying the id inside the variant
/// rules out mismatched (id, type) pairs.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum ProfileId {
    User(Id<UserMarker>),
    Community(Id<CommunityMarker>),
}

/// Author identity as surfaced in feeds and activity.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct AuthorRef {
    pub id: Id<UserMarker>,
    pub name: String,
    pub avatar: String,
}

impl From<&User> for AuthorRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct CommunityRef {
    pub id: Id<CommunityMarker>,
    pub name: String,
    pub avatar: String,
}

impl From<&Community> for CommunityRef {
    fn from(community: &Community) -> Self {
        Self {
            id: community.id.clone(),
            name: community.name.clone(),
            avatar: community.avatar.clone(),
        }
    }
}

/// One aggregated top-level post: authorship resolved, community resolved,
/// immediate replies reduced to their authors' avatars.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct FeedPost {
    pub id: Id<PostMarker>,
    pub body: String,
    pub parent_id: Option<Id<PostMarker>>,
    pub author: AuthorRef,
    pub community: Option<CommunityRef>,
    pub created_at: UtcDateTime,
    pub reply_avatars: Vec<String>,
}

/// The resolved identity of the profile a feed belongs to. Untagged on the
/// wire: both variants serialize to `{id, name, avatar}`.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ProfileRef {
    User(AuthorRef),
    Community(CommunityRef),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Feed {
    pub profile: ProfileRef,
    pub posts: Vec<FeedPost>,
}

/// A reply by another user on one of the subject user's posts.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Reply {
    pub id: Id<PostMarker>,
    pub body: String,
    pub parent_id: Option<Id<PostMarker>>,
    pub created_at: UtcDateTime,
    pub author: AuthorRef,
}
