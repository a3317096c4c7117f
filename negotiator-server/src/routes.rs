//! HTTP route handlers for the negotiation API.

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use negotiator::core::salary::{MarketData, calculate_target, market_data};
use negotiator::error::NegotiationError;
use negotiator::session::{SessionConfig, TurnResult};

use crate::state::{AppState, DEFAULT_SESSION_ID};

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/chat/initialize", post(initialize_chat))
        .route("/chat/message", post(send_message))
        .route("/salary", get(salary_lookup))
        .route("/salary/calculate", post(salary_calculate))
}

/// Full application: `/health` plus the API under `/api`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_router())
        .with_state(state)
}

/// JSON error body with a status code.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<NegotiationError> for ApiError {
    fn from(err: NegotiationError) -> Self {
        match &err {
            NegotiationError::Configuration(_) => Self::bad_request(err.to_string()),
            NegotiationError::NotInitialized => Self::new(StatusCode::CONFLICT, err.to_string()),
            NegotiationError::ModelTransport(_) => Self {
                status: StatusCode::BAD_GATEWAY,
                body: json!({
                    "error": "Failed to process message",
                    "details": err.to_string(),
                }),
            },
        }
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

fn session_id(body: &Value) -> String {
    body.get("sessionId")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_SESSION_ID)
        .to_string()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "timestamp": now_rfc3339() }))
}

/// POST /api/chat/initialize - start (or restart) a negotiation session.
async fn initialize_chat(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let config = SessionConfig::from_json(&body).map_err(|err| {
        warn!(error = %err, "rejected session initialization");
        ApiError {
            status: StatusCode::BAD_REQUEST,
            body: json!({
                "error": "Invalid or missing fields",
                "details": err.to_string(),
                "received": body.clone(),
            }),
        }
    })?;

    let id = session_id(&body);
    let session = state.session_or_create(&id);
    session.lock().await.initialize(config)?;
    info!(session_id = %id, "chat initialized");

    Ok(Json(json!({ "success": true })))
}

#[derive(Serialize)]
struct MessageResponse {
    response: TurnResult,
}

/// POST /api/chat/message - process one user turn.
async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<MessageResponse>, ApiError> {
    let prompt = body
        .get("prompt")
        .and_then(Value::as_str)
        .filter(|prompt| !prompt.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Prompt is required"))?;

    let session = state
        .session(&session_id(&body))
        .ok_or(NegotiationError::NotInitialized)?;
    let response = session.lock().await.process_turn(prompt).await?;

    Ok(Json(MessageResponse { response }))
}

#[derive(Deserialize)]
struct SalaryQuery {
    job: Option<String>,
}

#[derive(Serialize)]
struct SalaryResponse {
    #[serde(flatten)]
    data: MarketData,
    timestamp: String,
}

/// GET /api/salary?job=... - market data for a job title.
async fn salary_lookup(Query(query): Query<SalaryQuery>) -> Result<Json<SalaryResponse>, ApiError> {
    let job = query
        .job
        .filter(|job| !job.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Job title is required"))?;

    let data = market_data(&job).ok_or_else(|| ApiError {
        status: StatusCode::NOT_FOUND,
        body: json!({ "error": "No salary data found for this job title", "job": job }),
    })?;

    Ok(Json(SalaryResponse {
        data,
        timestamp: now_rfc3339(),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalculateRequest {
    market_rate: Option<f64>,
    achievements: Option<Vec<String>>,
    #[serde(default)]
    current_salary: Option<f64>,
}

/// POST /api/salary/calculate - target salary with achievement bonuses.
async fn salary_calculate(Json(body): Json<Value>) -> Result<Json<Value>, ApiError> {
    let request: CalculateRequest = serde_json::from_value(body)
        .map_err(|err| ApiError::bad_request(format!("Invalid request body: {err}")))?;

    let (Some(market_rate), Some(achievements)) = (request.market_rate, request.achievements)
    else {
        return Err(ApiError::bad_request(
            "Market rate and achievements are required",
        ));
    };
    let current_salary = request.current_salary.unwrap_or(0.0);
    if !market_rate.is_finite() || !current_salary.is_finite() {
        return Err(ApiError::bad_request("Salary amounts must be finite numbers"));
    }

    let target = calculate_target(
        market_rate.round() as i64,
        &achievements,
        current_salary.round() as i64,
    );
    let mut value = serde_json::to_value(&target)
        .map_err(|err| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;
    value["timestamp"] = json!(now_rfc3339());
    Ok(Json(value))
}
