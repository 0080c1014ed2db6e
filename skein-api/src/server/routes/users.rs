use crate::server::{Result, ServerError, ServerRouter, json::Json};
use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use skein_common::model::{
    Id,
    directory::{SortOrder, UserPage},
    feed::Reply,
    user::{ProfileUpdate, User, UserHandle, UserMarker},
};
use skein_db::client::PgThreadStore;
use skein_engine::{
    activity::ActivityResolver,
    directory::{DEFAULT_PAGE_SIZE, SearchRequest, UserDirectory},
    profile::ProfileWriter,
    store::ThreadStore,
};

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(get_user)
        .typed_get(search_users)
        .typed_get(get_activity)
        .typed_put(update_profile)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{id}", rejection(ServerError))]
struct GetUserPath {
    id: Id<UserMarker>,
}

async fn get_user(
    GetUserPath { id }: GetUserPath,
    State(store): State<PgThreadStore>,
) -> Result<Json<User>> {
    let user = store
        .user_by_id(&id)
        .await?
        .ok_or(ServerError::UserByIdNotFound(id))?;

    Ok(Json(user))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users", rejection(ServerError))]
struct SearchUsersPath;

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Deserialize)]
struct SearchParams {
    viewer: Id<UserMarker>,
    #[serde(default)]
    search: String,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
    #[serde(default)]
    sort: SortOrder,
}

async fn search_users(
    SearchUsersPath: SearchUsersPath,
    State(directory): State<UserDirectory<PgThreadStore>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<UserPage>> {
    let Query(params) = params?;
    let request = SearchRequest {
        text: params.search,
        page: params.page,
        page_size: params.page_size,
        sort: params.sort,
    };
    let page = directory.search(&params.viewer, &request).await?;

    Ok(Json(page))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{id}/activity", rejection(ServerError))]
struct GetActivityPath {
    id: Id<UserMarker>,
}

async fn get_activity(
    GetActivityPath { id }: GetActivityPath,
    State(activity): State<ActivityResolver<PgThreadStore>>,
) -> Result<Json<Vec<Reply>>> {
    let replies = activity.activity(&id).await?;

    Ok(Json(replies))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{id}/profile", rejection(ServerError))]
struct UpdateProfilePath {
    id: Id<UserMarker>,
}

#[derive(Deserialize)]
struct ProfileBody {
    handle: UserHandle,
    name: String,
    bio: String,
    avatar: String,
}

async fn update_profile(
    UpdateProfilePath { id }: UpdateProfilePath,
    State(writer): State<ProfileWriter<PgThreadStore>>,
    Json(body): Json<ProfileBody>,
) -> Result<StatusCode> {
    let update = ProfileUpdate {
        user_id: id,
        handle: body.handle,
        name: body.name,
        bio: body.bio,
        avatar: body.avatar,
    };
    writer.update_profile(&update).await?;

    Ok(StatusCode::NO_CONTENT)
}
