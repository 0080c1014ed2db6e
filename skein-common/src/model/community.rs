use crate::model::{Id, post::PostMarker};
use serde::{Deserialize, Serialize};
use time::UtcDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommunityMarker;

/// A community is a peer author type to a user: it owns the identity of the
/// posts in `post_ids`, while each post keeps its own stored user author.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Community {
    pub id: Id<CommunityMarker>,
    pub name: String,
    pub avatar: String,
    pub created_at: UtcDateTime,
    pub post_ids: Vec<Id<PostMarker>>,
}
