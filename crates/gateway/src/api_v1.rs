//! HTTP API v1.
//!
//! Endpoints:
//!
//! - `POST   /v1/chat`                Send a message (text and/or image)
//! - `POST   /v1/calculator`          Advance the guided estimator
//! - `POST   /v1/sessions/{id}/clear`  Reset a session
//! - `DELETE /v1/sessions/{id}`       Drop a session
//! - `GET    /v1/topics?q=`           Preview knowledge ranking for a query

use crate::SharedState;
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tensive_agent::{NormalizedResponse, Utterance};
use tensive_core::Assets;
use tensive_tools::CalculatorField;
use tracing::{debug, info};

/// Longest client-chosen session id accepted.
const MAX_SESSION_ID_LEN: usize = 128;

pub fn v1_router() -> Router<SharedState> {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/calculator", post(calculator_handler))
        .route("/sessions/{id}/clear", post(clear_session_handler))
        .route("/sessions/{id}", delete(delete_session_handler))
        .route("/topics", get(topics_handler))
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Image URL or data URI
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CalculatorRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    /// Free-text answer to the pending question
    #[serde(default)]
    pub input: Option<String>,
    /// Structured selection; takes precedence over `input`
    #[serde(default)]
    pub field: Option<CalculatorField>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TurnResponse {
    pub session_id: String,
    pub response: NormalizedResponse,
}

#[derive(Debug, Deserialize)]
pub struct TopicsQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopicMatch {
    pub title: String,
    pub score: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopicsResponse {
    pub query: String,
    pub matches: Vec<TopicMatch>,
    /// Title of the entry that would be injected in full
    pub grounding: Option<String>,
    /// Assets the caller would receive
    pub assets: Option<Assets>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn check_session_id(id: &Option<String>) -> Result<(), ApiError> {
    match id {
        Some(id) if id.trim().is_empty() || id.len() > MAX_SESSION_ID_LEN => Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("session_id must be 1 to {MAX_SESSION_ID_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    check_session_id(&payload.session_id)?;
    let utterance = Utterance::new(payload.message, payload.image)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let session = state.session(payload.session_id).await;
    info!(session = %session.id(), "v1/chat request");

    let response = session.process_message(utterance).await;
    Ok(Json(TurnResponse {
        session_id: session.id().to_string(),
        response,
    }))
}

async fn calculator_handler(
    State(state): State<SharedState>,
    Json(payload): Json<CalculatorRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    check_session_id(&payload.session_id)?;
    let session = state.session(payload.session_id).await;

    let response = match payload.field {
        Some(field) => session
            .update_calculator(field)
            .await
            .map_err(|e| api_error(StatusCode::CONFLICT, e.to_string()))?,
        None => {
            session
                .advance_calculator(payload.input.as_deref().unwrap_or_default())
                .await
        }
    };

    debug!(session = %session.id(), "v1/calculator step");
    Ok(Json(TurnResponse {
        session_id: session.id().to_string(),
        response,
    }))
}

async fn clear_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session = state
        .existing(&id)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("no session '{id}'")))?;
    session.clear_history().await;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(StatusCode::NOT_FOUND, format!("no session '{id}'")))
    }
}

async fn topics_handler(
    State(state): State<SharedState>,
    Query(query): Query<TopicsQuery>,
) -> Json<TopicsResponse> {
    let knowledge = state.orchestrator.knowledge();
    let policy = state.orchestrator.policy();
    let ranking = knowledge.rank(&query.q);
    let retrieval = policy.select(&ranking);

    Json(TopicsResponse {
        matches: ranking
            .iter()
            .take(policy.see_also_limit)
            .map(|m| TopicMatch {
                title: m.entry.title.clone(),
                score: m.score,
            })
            .collect(),
        grounding: retrieval.grounding.map(|g| g.entry.title.clone()),
        assets: retrieval.released_assets().cloned(),
        query: query.q,
    })
}
