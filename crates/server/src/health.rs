use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use lumiere_core::config::AppConfig;
use serde::Serialize;

/// Deployment identity reported by the readiness endpoint. No outbound
/// capability calls are made here; readiness reflects this process only.
#[derive(Clone)]
pub struct HealthState {
    llm_model: String,
    embedding_model: String,
    embedding_dimension: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub llm_model: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub checked_at: String,
}

pub fn router(config: &AppConfig) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState {
        llm_model: config.llm.model.clone(),
        embedding_model: config.embedding.model.clone(),
        embedding_dimension: config.embedding.dimension,
    })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        llm_model: state.llm_model,
        embedding_model: state.embedding_model,
        embedding_dimension: state.embedding_dimension,
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}
