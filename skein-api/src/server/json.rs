use crate::server::ServerError;
use axum::{
    Json as AxumJson,
    extract::FromRequest,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Body wrapper whose extraction and serialization failures surface as
/// [`ServerError`] instead of axum's default rejections.
#[derive(FromRequest, Debug, Clone, Copy, Default)]
#[from_request(via(AxumJson), rejection(ServerError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(body) => {
                let content_type = (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                ([content_type], body).into_response()
            }
            Err(source) => ServerError::JsonResponse(source).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::server::json::Json;
    use axum::{http::header, response::IntoResponse};

    #[test]
    fn responses_carry_the_json_content_type() {
        let response = Json(vec![1, 2, 3]).into_response();
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("application/json")
        );
    }
}
