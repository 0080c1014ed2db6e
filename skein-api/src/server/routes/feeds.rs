use crate::server::{Result, ServerError, ServerRouter, json::Json};
use axum::extract::{Query, State, rejection::QueryRejection};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use skein_common::model::{
    Id,
    community::CommunityMarker,
    feed::{Feed, ProfileId},
    user::UserMarker,
};
use skein_db::client::PgThreadStore;
use skein_engine::aggregate::PostAggregator;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(get_user_feed)
        .typed_get(get_community_feed)
}

#[derive(Deserialize)]
struct FeedParams {
    viewer: Id<UserMarker>,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{id}/feed", rejection(ServerError))]
struct UserFeedPath {
    id: Id<UserMarker>,
}

async fn get_user_feed(
    UserFeedPath { id }: UserFeedPath,
    State(aggregator): State<PostAggregator<PgThreadStore>>,
    params: Result<Query<FeedParams>, QueryRejection>,
) -> Result<Json<Feed>> {
    let Query(params) = params?;
    let feed = aggregator
        .profile_feed(&ProfileId::User(id), &params.viewer)
        .await?;

    Ok(Json(feed))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/communities/{id}/feed", rejection(ServerError))]
struct CommunityFeedPath {
    id: Id<CommunityMarker>,
}

async fn get_community_feed(
    CommunityFeedPath { id }: CommunityFeedPath,
    State(aggregator): State<PostAggregator<PgThreadStore>>,
    params: Result<Query<FeedParams>, QueryRejection>,
) -> Result<Json<Feed>> {
    let Query(params) = params?;
    let feed = aggregator
        .profile_feed(&ProfileId::Community(id), &params.viewer)
        .await?;

    Ok(Json(feed))
}
