//! # Quoteboard Web
//!
//! axum front-end for [`quoteboard_core`].
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /`, `GET /results` | Search form |
//! | `POST /results` | Results page, or the form with an error |
//! | `GET /api/stock` | Same result as JSON |
//! | `GET /favicon.ico`, `GET /static/*` | Static assets |

pub mod error;
pub mod pages;
pub mod routes;

use std::any::Any;
use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use quoteboard_core::RequestOrchestrator;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info_span, Span};

pub use error::WebError;

use crate::pages::{render_index, UNEXPECTED_ERROR};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<RequestOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: RequestOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

pub fn router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let static_dir = static_dir.as_ref();

    Router::new()
        .route("/", get(routes::index))
        .route("/results", get(routes::index).post(routes::results))
        .route("/api/stock", get(routes::stock_api))
        .route_service("/favicon.ico", ServeFile::new(static_dir.join("favicon.ico")))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
}

/// One span per request; handlers fill in `symbol` once the input is read.
fn request_span(request: &Request<Body>) -> Span {
    info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        symbol = tracing::field::Empty,
    )
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!(detail, "request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(render_index(Some(UNEXPECTED_ERROR))),
    )
        .into_response()
}
