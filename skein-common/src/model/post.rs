use crate::model::{Id, community::CommunityMarker, user::UserMarker};
use serde::{Deserialize, Serialize};
use time::UtcDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

/// A thread post. A post with `parent_id == None` is top-level; otherwise it
/// is a reply and the store keeps it listed in its parent's `child_ids`.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub body: String,
    pub parent_id: Option<Id<PostMarker>>,
    pub author_id: Id<UserMarker>,
    pub community_id: Option<Id<CommunityMarker>>,
    pub created_at: UtcDateTime,
    /// Immediate replies, insertion order. Not necessarily chronological.
    pub child_ids: Vec<Id<PostMarker>>,
}

impl Post {
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}
