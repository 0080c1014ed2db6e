use crate::model::{Id, post::PostMarker};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use thiserror::Error;
use time::UtcDateTime;

pub const USER_HANDLE_MAX_LEN: usize = 50;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    pub handle: UserHandle,
    pub name: String,
    pub bio: String,
    pub avatar: String,
    pub onboarded: bool,
    pub created_at: UtcDateTime,
    /// Authored posts, insertion order. Replies included.
    pub post_ids: Vec<Id<PostMarker>>,
}

/// The fields a profile upsert overwrites. `post_ids` stays untouched and
/// the onboarded flag is set by the store as part of the upsert.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct ProfileUpdate {
    pub user_id: Id<UserMarker>,
    pub handle: UserHandle,
    pub name: String,
    pub bio: String,
    pub avatar: String,
}

/// Lowercase-normalized user handle. The constructor normalizes, so any
/// value of this type is already in its stored form.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct UserHandle(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The user handle is invalid: {0}")]
pub struct InvalidUserHandleError(String);

impl UserHandle {
    pub fn new(handle: impl Into<String>) -> Result<Self, InvalidUserHandleError> {
        let handle = handle.into();
        if handle.chars().count() <= USER_HANDLE_MAX_LEN {
            Ok(UserHandle(handle.to_lowercase()))
        } else {
            Err(InvalidUserHandleError(handle))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for UserHandle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        UserHandle::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"UserHandle"))
    }
}
