//! HTTP endpoint handlers. Thin wrappers that forward to the chat router.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::chat::handle_chat;
use crate::protocol::{ChatIn, ChatOut, HealthOut, TopicsOut};
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_topics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let topics = state
    .bank
    .available_topics()
    .into_iter()
    .map(str::to_string)
    .collect();
  Json(TopicsOut { topics })
}

#[instrument(level = "info", skip(state, body), fields(user_id = body.user_id, text_len = body.text.len()))]
pub async fn http_post_chat(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ChatIn>,
) -> impl IntoResponse {
  let messages = handle_chat(&state, body.user_id, &body.text).await;
  info!(target: "student_helper", user_id = body.user_id, replies = messages.len(), "HTTP chat handled");
  Json(ChatOut { messages })
}
