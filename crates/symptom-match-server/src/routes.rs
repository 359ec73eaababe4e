//! HTTP routes.
//!
//! Routes are nested under `/api/`:
//! - `POST /api/symptoms`: rank conditions from a symptom list or free text
//! - `POST /api/checkSymptoms`: recognise symptoms in free text
//! - `GET /api/health`: catalog size and model readiness

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use symptom_match_core::{Matcher, RankedResult};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, Instrument};

use crate::error::ApiError;

/// Body returned when no condition matched.
pub const NO_MATCH_MESSAGE: &str = "No matching conditions found";

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Matcher,
}

impl AppState {
    pub fn new(matcher: Matcher) -> Self {
        Self { matcher }
    }
}

/// Matching request: either an explicit list or free text.
#[derive(Debug, Default, Deserialize)]
pub struct SymptomRequest {
    #[serde(default)]
    pub symptoms: Option<Vec<String>>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default, rename = "userInput")]
    pub user_input: Option<String>,
}

impl SymptomRequest {
    fn text(&self) -> Option<&str> {
        self.input.as_deref().or(self.user_input.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub struct NoMatchBody {
    pub message: &'static str,
    pub results: [Value; 0],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSymptomsResponse {
    pub matched_symptoms: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub conditions: usize,
    pub model_ready: bool,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/symptoms", post(match_symptoms))
        .route("/checkSymptoms", post(check_symptoms))
        .route("/health", get(health))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .layer(axum::middleware::from_fn(request_span))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Run each request inside a span tagged with a fresh request id.
async fn request_span(req: Request<axum::body::Body>, next: Next) -> Response {
    let span = tracing::info_span!(
        "request",
        request_id = %uuid::Uuid::new_v4(),
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let response = next.run(req).await;
        info!(status = response.status().as_u16(), "Request completed");
        response
    }
    .instrument(span)
    .await
}

/// Rank conditions for a symptom list or a free-text description.
async fn match_symptoms(
    State(state): State<AppState>,
    payload: Result<Json<SymptomRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;

    let result = if let Some(symptoms) = &request.symptoms {
        debug!(count = symptoms.len(), "Matching symptom list");
        state.matcher.match_by_symptom_list(symptoms)?
    } else if let Some(text) = request.text() {
        debug!(chars = text.len(), "Matching free text");
        state.matcher.match_by_text(text).await?
    } else {
        return Err(ApiError::BadRequest(
            "request must contain `symptoms`, `input` or `userInput`".into(),
        ));
    };

    ranked_body(&result).map(Json)
}

/// Recognise symptoms in free text without ranking conditions.
async fn check_symptoms(
    State(state): State<AppState>,
    payload: Result<Json<SymptomRequest>, JsonRejection>,
) -> Result<Json<CheckSymptomsResponse>, ApiError> {
    let Json(request) = payload?;
    let text = request
        .text()
        .ok_or_else(|| ApiError::BadRequest("request must contain `userInput`".into()))?;

    let query = state.matcher.extract_symptoms(text).await?;
    Ok(Json(CheckSymptomsResponse {
        matched_symptoms: query.tokens().to_vec(),
    }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        conditions: state.matcher.catalog().len(),
        model_ready: state.matcher.is_text_ready(),
    })
}

/// Wire shape of a ranking: the entry array, or the no-match message object.
pub fn ranked_body(result: &RankedResult) -> Result<Value, ApiError> {
    let body = match result {
        RankedResult::Ranked(entries) => serde_json::to_value(entries),
        RankedResult::NoMatch => serde_json::to_value(NoMatchBody {
            message: NO_MATCH_MESSAGE,
            results: [],
        }),
    };
    body.map_err(|e| ApiError::Internal(e.to_string()))
}
