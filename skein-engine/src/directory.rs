use crate::{
    error::{EngineError, Operation},
    store::ThreadStore,
};
use skein_common::model::{
    Id,
    directory::{SortOrder, UserFilter, UserPage},
    user::UserMarker,
};
use tracing::debug;

const OP: Operation = Operation::SearchUsers;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Search parameters as the caller supplies them. Blank `text` means no text
/// filter; `page` is one-based.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct SearchRequest {
    pub text: String,
    pub page: u32,
    pub page_size: u32,
    pub sort: SortOrder,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortOrder::Desc,
        }
    }
}

/// Paginated, case-insensitive, viewer-excluding user search.
#[derive(Clone, Debug)]
pub struct UserDirectory<S> {
    store: S,
}

impl<S: ThreadStore> UserDirectory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns one page of users matching the request, never including the
    /// viewer. `has_next` comes from a true count of all matches, so it is
    /// exact even when later pages are empty.
    ///
    /// The page query and the count query are independent and issued
    /// concurrently.
    pub async fn search(
        &self,
        viewer: &Id<UserMarker>,
        request: &SearchRequest,
    ) -> Result<UserPage, EngineError> {
        if request.page == 0 {
            return Err(EngineError::invalid_argument(OP, "page numbers start at 1"));
        }
        if request.page_size == 0 {
            return Err(EngineError::invalid_argument(OP, "page size must be at least 1"));
        }

        let skip = u64::from(request.page - 1) * u64::from(request.page_size);
        let text = request.text.trim();
        let filter = UserFilter {
            text: (!text.is_empty()).then(|| text.to_owned()),
            exclude: Some(viewer.clone()),
            sort: request.sort,
            skip,
            limit: Some(u64::from(request.page_size)),
        };

        debug!(%viewer, page = request.page, "searching user directory");

        let (users, total) = tokio::try_join!(
            self.store.find_users(&filter),
            self.store.count_users(&filter),
        )
        .map_err(|source| EngineError::query(OP, source))?;

        let returned = u64::try_from(users.len()).unwrap_or(u64::MAX);
        let has_next = total > skip + returned;
        Ok(UserPage { users, has_next })
    }
}
