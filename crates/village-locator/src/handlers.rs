use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::answer::AnswerGenerator;
use crate::resolver::{MatchResult, Resolver};

pub const MAX_QUERY_LEN: usize = 256;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    /// Held for callers that want it; no route invokes it.
    pub assistant: Option<Arc<dyn AnswerGenerator>>,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct ResolveQuery {
    pub q: String,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    query: String,
    found: bool,
    district: Option<String>,
    taluka: Option<String>,
    village: Option<String>,
    score: Option<f64>,
    message: String,
}

impl ResolveResponse {
    fn new(query: String, result: MatchResult) -> Self {
        let message = result.describe(&query);
        match result {
            MatchResult::Found {
                district,
                taluka,
                village,
                score,
            } => Self {
                query,
                found: true,
                district: Some(district),
                taluka: Some(taluka),
                village: Some(village),
                score: Some(score),
                message,
            },
            MatchResult::NotFound => Self {
                query,
                found: false,
                district: None,
                taluka: None,
                village: None,
                score: None,
                message,
            },
        }
    }
}

#[derive(Serialize)]
struct DistrictSummary<'a> {
    name: &'a str,
    talukas: Vec<TalukaSummary<'a>>,
}

#[derive(Serialize)]
struct TalukaSummary<'a> {
    name: &'a str,
    villages: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/resolve", get(resolve))
        .route("/v1/districts", get(districts))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn resolve(
    State(state): State<AppState>,
    Query(params): Query<ResolveQuery>,
) -> Result<Response, ApiError> {
    if params.q.chars().count() > MAX_QUERY_LEN {
        return Err(ApiError::bad_request(format!(
            "q must be at most {MAX_QUERY_LEN} characters"
        )));
    }

    let result = state.resolver.resolve(&params.q);
    debug!(query = %params.q, found = result.is_found(), "resolved query");
    let response = ResolveResponse::new(params.q, result);
    Ok(with_cache_headers(&state, Json(response)))
}

async fn districts(State(state): State<AppState>) -> Response {
    let table = state.resolver.table();
    let summary: Vec<DistrictSummary<'_>> = table
        .districts()
        .map(|district| DistrictSummary {
            name: district,
            talukas: table
                .talukas(district)
                .into_iter()
                .flatten()
                .map(|taluka| TalukaSummary {
                    name: taluka,
                    villages: table.villages(district, taluka).map_or(0, <[String]>::len),
                })
                .collect(),
        })
        .collect();
    with_cache_headers(&state, Json(json!({ "districts": summary })))
}

fn with_cache_headers(state: &AppState, body: impl IntoResponse) -> Response {
    if state.disable_cache {
        return body.into_response();
    }
    (
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=300"),
        )],
        body,
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}
