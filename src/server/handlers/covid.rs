//! Case/death table endpoints.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{error, info};

use super::super::shape::OutputShape;
use super::super::AppState;
use crate::models::{FeedFilter, JoinedRecord};
use crate::scrapers::ScrapeError;

const MISSING_FILTER: &str = "please provide \"country\" or \"code\" in your payload.";

/// Filter and shape parameters, from a JSON body or the query string.
#[derive(Debug, Default, Deserialize)]
pub struct CovidParams {
    pub country: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub shape: Option<String>,
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

/// Map a pipeline failure to a response. Nothing partial is returned.
fn scrape_error_response(err: ScrapeError) -> Response {
    let status = match err {
        ScrapeError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ref e if e.is_upstream() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!("Request failed ({}): {}", status, err);

    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

/// The body is read as JSON whatever its content type. An empty body falls
/// back to the query string.
fn parse_params(query: CovidParams, body: &[u8]) -> Result<CovidParams, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(query);
    }
    serde_json::from_slice(body).map_err(|e| format!("invalid JSON payload: {}", e))
}

/// Feed table filtered by `country` or `code`, in the requested shape.
pub async fn covid(
    State(state): State<AppState>,
    Query(query): Query<CovidParams>,
    body: Bytes,
) -> Response {
    let params = match parse_params(query, &body) {
        Ok(params) => params,
        Err(message) => return bad_request(message),
    };

    let shape = match params.shape.as_deref() {
        None => OutputShape::default(),
        Some(name) => match OutputShape::parse(name) {
            Some(shape) => shape,
            None => return bad_request(format!("unknown type {:?}", name)),
        },
    };

    let Some(filter) = FeedFilter::from_request(params.country.as_deref(), params.code.as_deref())
    else {
        return bad_request(MISSING_FILTER);
    };

    info!("Feed request: {:?} as {}", filter, shape.as_str());

    let table = match state.source.feed().await {
        Ok(table) => table,
        Err(e) => return scrape_error_response(e),
    };

    let rows = table.filter(&filter);
    Json(shape.render(&rows)).into_response()
}

/// Full regional table as `{column: [values]}`.
pub async fn covid_regions(State(state): State<AppState>) -> Response {
    info!("Regional request");

    let records = match state.source.regions().await {
        Ok(records) => records,
        Err(e) => return scrape_error_response(e),
    };

    let rows: Vec<&JoinedRecord> = records.iter().collect();
    Json(OutputShape::List.render(&rows)).into_response()
}

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}
