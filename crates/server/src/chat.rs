//! Chat API routes.
//!
//! Endpoints:
//! - `POST /api/chat` — classify one user message and answer with chat text
//!   plus up to five matching products.
//!
//! Every failure keeps the reply envelope shape (`type`/`text`/`products`)
//! and adds a machine-readable `error` field, so the chat client renders
//! `text` the same way on success and failure. Three failure classes exist:
//! missing message (400), dimension-mismatch configuration error (400), and
//! everything else (500).

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use lumiere_agent::runtime::{ChatError, ChatRuntime};
use lumiere_core::{ChatReply, Product};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Clone)]
pub struct ChatState {
    runtime: Arc<ChatRuntime>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatErrorResponse {
    pub error: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
    pub products: Vec<Product>,
}

const MISSING_MESSAGE_TEXT: &str = "Please type a message so I can help you.";

const CONFIG_ERROR_TEXT: &str = "⚠️ Configuration Error: the similarity index dimensions don't match the embedding model. Check `embedding.dimension` against the index schema.";

const GENERIC_ERROR_TEXT: &str =
    "I encountered an error while processing your request. Please try again.";

pub fn router(runtime: Arc<ChatRuntime>) -> Router {
    Router::new().route("/api/chat", post(chat)).with_state(ChatState { runtime })
}

async fn chat(
    State(state): State<ChatState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatReply>, (StatusCode, Json<ChatErrorResponse>)> {
    let message = body.message.unwrap_or_default();

    match state.runtime.handle_message(&message).await {
        Ok(reply) => {
            info!(
                event_name = "chat.reply",
                products = reply.products.len(),
                "chat turn completed"
            );
            Ok(Json(reply))
        }
        Err(error) => Err(error_response(error)),
    }
}

fn error_response(chat_error: ChatError) -> (StatusCode, Json<ChatErrorResponse>) {
    match &chat_error {
        ChatError::MissingMessage => (
            StatusCode::BAD_REQUEST,
            Json(ChatErrorResponse {
                error: "Message is required".to_string(),
                kind: "bot",
                text: MISSING_MESSAGE_TEXT.to_string(),
                products: Vec::new(),
            }),
        ),
        ChatError::Retrieval(retrieval) if retrieval.is_configuration() => {
            error!(
                event_name = "chat.config_error",
                error = %retrieval,
                "embedding model and index schema disagree on dimensions"
            );
            (
                StatusCode::BAD_REQUEST,
                Json(ChatErrorResponse {
                    error: format!("Configuration error: {retrieval}"),
                    kind: "bot",
                    text: CONFIG_ERROR_TEXT.to_string(),
                    products: Vec::new(),
                }),
            )
        }
        ChatError::Retrieval(retrieval) => {
            error!(
                event_name = "chat.retrieval_error",
                error = %retrieval,
                "product retrieval failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatErrorResponse {
                    error: retrieval.to_string(),
                    kind: "bot",
                    text: GENERIC_ERROR_TEXT.to_string(),
                    products: Vec::new(),
                }),
            )
        }
    }
}
