use skein_common::model::{
    Id, ModelValidationError,
    community::Community,
    post::Post,
    user::{User, UserHandle},
};
use sqlx::FromRow;
use time::PrimitiveDateTime;

#[derive(Clone, Debug, FromRow)]
pub(crate) struct UserRow {
    pub user_id: String,
    pub handle: String,
    pub display_name: String,
    pub bio: String,
    pub avatar: String,
    pub onboarded: bool,
    pub created_at: PrimitiveDateTime,
    pub post_ids: Vec<String>,
}

#[derive(Clone, Debug, FromRow)]
pub(crate) struct CommunityRow {
    pub community_id: String,
    pub display_name: String,
    pub avatar: String,
    pub created_at: PrimitiveDateTime,
    pub post_ids: Vec<String>,
}

#[derive(Clone, Debug, FromRow)]
pub(crate) struct PostRow {
    pub post_id: String,
    pub body: String,
    pub parent_id: Option<String>,
    pub author_id: String,
    pub community_id: Option<String>,
    pub created_at: PrimitiveDateTime,
    pub child_ids: Vec<String>,
}

impl TryFrom<UserRow> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.user_id.into(),
            handle: UserHandle::new(value.handle)?,
            name: value.display_name,
            bio: value.bio,
            avatar: value.avatar,
            onboarded: value.onboarded,
            created_at: value.created_at.as_utc(),
            post_ids: value.post_ids.into_iter().map(Id::new).collect(),
        })
    }
}

impl From<CommunityRow> for Community {
    fn from(value: CommunityRow) -> Self {
        Self {
            id: value.community_id.into(),
            name: value.display_name,
            avatar: value.avatar,
            created_at: value.created_at.as_utc(),
            post_ids: value.post_ids.into_iter().map(Id::new).collect(),
        }
    }
}

impl From<PostRow> for Post {
    fn from(value: PostRow) -> Self {
        Self {
            id: value.post_id.into(),
            body: value.body,
            parent_id: value.parent_id.map(Id::new),
            author_id: value.author_id.into(),
            community_id: value.community_id.map(Id::new),
            created_at: value.created_at.as_utc(),
            child_ids: value.child_ids.into_iter().map(Id::new).collect(),
        }
    }
}
