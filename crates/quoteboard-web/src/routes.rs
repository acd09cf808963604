//! Request handlers.

use axum::extract::rejection::FormRejection;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::{Form, Json};
use quoteboard_core::PresentationResult;
use serde::Deserialize;
use tracing::{warn, Span};

use crate::error::WebError;
use crate::pages::{render_index, render_results, DEFAULT_END_DATE, DEFAULT_START_DATE};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ResultsForm {
    #[serde(default)]
    pub stock_symbol: String,
    #[serde(default = "default_start_date")]
    pub start_date: String,
    #[serde(default = "default_end_date")]
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    #[serde(default)]
    pub symbol: String,
    #[serde(default = "default_start_date")]
    pub start_date: String,
    #[serde(default = "default_end_date")]
    pub end_date: String,
}

fn default_start_date() -> String {
    DEFAULT_START_DATE.to_owned()
}

fn default_end_date() -> String {
    DEFAULT_END_DATE.to_owned()
}

pub async fn index() -> Html<String> {
    Html(render_index(None))
}

pub async fn results(
    State(state): State<AppState>,
    form: Result<Form<ResultsForm>, FormRejection>,
) -> Result<Html<String>, WebError> {
    // An unreadable body is treated like an empty form.
    let form = form.map(|Form(form)| form).unwrap_or_else(|rejection| {
        warn!(%rejection, "unreadable lookup form");
        ResultsForm {
            start_date: default_start_date(),
            end_date: default_end_date(),
            ..ResultsForm::default()
        }
    });
    record_symbol(&form.stock_symbol);

    let result = state
        .orchestrator
        .handle(&form.stock_symbol, &form.start_date, &form.end_date)
        .await
        .map_err(WebError::Page)?;

    Ok(Html(render_results(&result)))
}

pub async fn stock_api(
    State(state): State<AppState>,
    Query(query): Query<StockQuery>,
) -> Result<Json<PresentationResult>, WebError> {
    record_symbol(&query.symbol);

    state
        .orchestrator
        .handle(&query.symbol, &query.start_date, &query.end_date)
        .await
        .map(Json)
        .map_err(WebError::Api)
}

/// Attach the submitted symbol to the request span so later failures, panics included, carry it.
fn record_symbol(raw: &str) {
    Span::current().record("symbol", tracing::field::display(raw.trim()));
}
