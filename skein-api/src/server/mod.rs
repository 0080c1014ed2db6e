use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use json::Json;
use serde::{Deserialize, Serialize};
use skein_common::model::{Id, user::UserMarker};
use skein_db::client::PgThreadStore;
use skein_engine::{
    activity::ActivityResolver,
    aggregate::PostAggregator,
    directory::UserDirectory,
    error::{EngineError, ErrorKind},
    profile::ProfileWriter,
    store::StoreError,
};
use thiserror::Error;
use tracing::error;

mod json;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, FromRef)]
pub struct ServerState {
    pub store: PgThreadStore,
    pub aggregator: PostAggregator<PgThreadStore>,
    pub directory: UserDirectory<PgThreadStore>,
    pub activity: ActivityResolver<PgThreadStore>,
    pub profile_writer: ProfileWriter<PgThreadStore>,
}

impl ServerState {
    #[must_use]
    pub fn new(store: PgThreadStore) -> Self {
        Self {
            aggregator: PostAggregator::new(store.clone()),
            directory: UserDirectory::new(store.clone()),
            activity: ActivityResolver::new(store.clone()),
            profile_writer: ProfileWriter::new(store.clone()),
            store,
        }
    }
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Query rejected: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("Store query failed: {0}")]
    Store(#[from] StoreError),
    #[error("User with id {0} was not found.")]
    UserByIdNotFound(Id<UserMarker>),
}

impl Default for ServerError {
    fn default() -> Self {
        Self::UnknownRoute(Uri::default())
    }
}

impl ServerError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::UserByIdNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::QueryRejection(_) | ServerError::JsonRejection(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::JsonResponse(_) | ServerError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Engine(err) => match err.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
                ErrorKind::Query | ErrorKind::Write => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
struct ErrorResponse {
    status: u16,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
        };
        (status, Json(error_response)).into_response()
    }
}
