use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use quoteboard_core::RequestError;
use serde_json::json;
use thiserror::Error;

use crate::pages::render_index;

/// Handler failures, rendered either as the form page or as a JSON error body.
#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Page(RequestError),

    #[error(transparent)]
    Api(RequestError),
}

impl WebError {
    pub fn request(&self) -> &RequestError {
        match self {
            Self::Page(error) | Self::Api(error) => error,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.request().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.request().user_message();

        match self {
            Self::Page(_) => (status, Html(render_index(Some(&message)))).into_response(),
            Self::Api(_) => (status, Json(json!({ "error": message }))).into_response(),
        }
    }
}
