use crate::model::{
    Id,
    user::{User, UserMarker},
};
use serde::{Deserialize, Serialize};

/// Sort direction over user creation time. Ties between equal timestamps are
/// implementation-defined.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Explicit directory filter handed to the store. `text` matches
/// case-insensitively as an unanchored substring against handle or display
/// name; the count operation evaluates the same filter but ignores
/// `sort`, `skip` and `limit`.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct UserFilter {
    pub text: Option<String>,
    pub exclude: Option<Id<UserMarker>>,
    pub sort: SortOrder,
    pub skip: u64,
    pub limit: Option<u64>,
}

/// One page of directory results with a true-count "more pages" signal.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct UserPage {
    pub users: Vec<User>,
    pub has_next: bool,
}
