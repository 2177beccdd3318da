//! Route handlers.

use crate::error::ApiError;
use crate::state::AppState;
use crate::uptime::format_uptime;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use log::info;
use parley_memory::MemoryStats;
use parley_protocol::{
    AdminStatusResponse, ApiInfoResponse, ChatRequest, ChatResponse, ClearAllResponse,
    HealthResponse, MemoryStatsResponse, MemoryStatsView, SERVICE_NAME, SessionClearResponse,
    TestChatRequest, TestChatResponse,
};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client-supplied identifiers: letters, digits, `_` and `-`, at most 100 chars.
static IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,100}$").ok());

/// Optional caller identity for session-scoped routes.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ScopeQuery {
    user_id: Option<String>,
}

fn validate_identifier(field: &str, value: &str) -> Result<(), ApiError> {
    let Some(pattern) = IDENTIFIER.as_ref() else {
        return Err(ApiError::Internal("identifier pattern unavailable".to_string()));
    };
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "{field} must be 1-100 characters of letters, digits, '_' or '-'"
        )))
    }
}

/// Store key for a request; a caller identity prefixes the session id.
fn session_key(user_id: Option<&str>, session_id: &str) -> Result<String, ApiError> {
    validate_identifier("session_id", session_id)?;
    match user_id {
        Some(user_id) => {
            validate_identifier("user_id", user_id)?;
            Ok(format!("{user_id}:{session_id}"))
        }
        None => Ok(session_id.to_string()),
    }
}

fn stats_view(stats: MemoryStats) -> MemoryStatsView {
    MemoryStatsView {
        current_size: stats.current_size,
        max_size: stats.max_size,
        ttl_seconds: stats.ttl_seconds,
    }
}

pub(crate) async fn root() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        message: "Parley conversational chat API".to_string(),
        version: VERSION.to_string(),
        health: "/health".to_string(),
    })
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let healthy = state.orchestrator.provider_healthy().await;
    Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
    })
}

/// Run one chat turn on its own task; a dropped connection does not cancel it.
pub(crate) async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let key = session_key(request.user_id.as_deref(), &request.session_id)?;
    let reply = state
        .orchestrator
        .spawn_send(key, request.message)
        .finish()
        .await?;
    Ok(Json(ChatResponse {
        response: reply.response,
        session_id: request.session_id,
    }))
}

/// Clear one session. An id that could never have been stored is simply not found.
pub(crate) async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(scope): Query<ScopeQuery>,
) -> Json<SessionClearResponse> {
    let cleared = match session_key(scope.user_id.as_deref(), &session_id) {
        Ok(key) => state.orchestrator.clear(&key),
        Err(_) => false,
    };
    let message = if cleared {
        format!("Session {session_id} cleared successfully")
    } else {
        format!("Session {session_id} not found")
    };
    Json(SessionClearResponse { message, cleared })
}

pub(crate) async fn memory_stats(State(state): State<AppState>) -> Json<MemoryStatsResponse> {
    Json(MemoryStatsResponse {
        memory_stats: stats_view(state.orchestrator.stats()),
    })
}

pub(crate) async fn admin_status(State(state): State<AppState>) -> Json<AdminStatusResponse> {
    let provider_healthy = state.orchestrator.provider_healthy().await;
    let uptime_seconds = state.uptime_seconds();
    Json(AdminStatusResponse {
        provider: state.provider_info.clone(),
        provider_healthy,
        memory_stats: stats_view(state.orchestrator.stats()),
        uptime_seconds,
        uptime_formatted: format_uptime(uptime_seconds),
    })
}

pub(crate) async fn clear_all_sessions(State(state): State<AppState>) -> Json<ClearAllResponse> {
    let cleared = state.orchestrator.clear_all();
    info!("admin cleared all sessions (count={cleared})");
    Json(ClearAllResponse {
        message: format!("Cleared {cleared} sessions"),
        cleared,
    })
}

/// Probe the provider directly; failures are reported in the body.
pub(crate) async fn test_chat(
    State(state): State<AppState>,
    payload: Result<Json<TestChatRequest>, JsonRejection>,
) -> Result<Json<TestChatResponse>, ApiError> {
    let Json(request) = payload?;
    let response = match state.orchestrator.probe(&request.message).await {
        Ok(reply) => TestChatResponse {
            success: true,
            response: Some(reply),
            error: None,
        },
        Err(err) if err.is_client_error() => return Err(err.into()),
        Err(err) => TestChatResponse {
            success: false,
            response: None,
            error: Some(err.to_string()),
        },
    };
    Ok(Json(response))
}
