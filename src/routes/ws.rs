//! WebSocket upgrade + message loop. Each client message is parsed as JSON
//! and forwarded to the chat router. We reply with a single JSON message per
//! request, so per-user answers are applied in arrival order.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    Query, State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{error, info, instrument};

use crate::chat::handle_chat;
use crate::protocol::{ClientWsMessage, ServerWsMessage, WsQuery};
use crate::state::AppState;

#[instrument(level = "info", skip(state), fields(user_id = q.user_id))]
pub async fn ws_upgrade(
  ws: WebSocketUpgrade,
  Query(q): Query<WsQuery>,
  State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
  info!(target: "student_helper", user_id = q.user_id, "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state, q.user_id))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, user_id: i64) {
  info!(target: "student_helper", user_id, "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(ClientWsMessage::Ping) => ServerWsMessage::Pong,
          Ok(ClientWsMessage::Chat { text }) => {
            let messages = handle_chat(&state, user_id, &text).await;
            ServerWsMessage::Reply { messages }
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) })
            .to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "student_helper", user_id, error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => {
        let _ = socket.send(Message::Pong(payload)).await;
      }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "student_helper", user_id, "WebSocket disconnected");
}
