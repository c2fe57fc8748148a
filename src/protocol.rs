//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable so transports and clients evolve independently.

use serde::{Deserialize, Serialize};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
  Ping,
  Chat { text: String },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
  Pong,
  /// Zero or more chat lines produced by the command router.
  Reply { messages: Vec<String> },
  Error { message: String },
}

/// Identity carried on the WebSocket upgrade: `/ws?user_id=N`.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
  pub user_id: i64,
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct ChatIn {
  #[serde(rename = "userId")]
  pub user_id: i64,
  pub text: String,
}

#[derive(Serialize)]
pub struct ChatOut {
  pub messages: Vec<String>,
}

#[derive(Serialize)]
pub struct TopicsOut {
  pub topics: Vec<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn client_messages_parse_from_tagged_json() {
    let msg: ClientWsMessage = serde_json::from_str(r#"{"type":"ping"}"#).expect("parse");
    assert!(matches!(msg, ClientWsMessage::Ping));

    let msg: ClientWsMessage =
      serde_json::from_str(r#"{"type":"chat","text":"/quiz math"}"#).expect("parse");
    match msg {
      ClientWsMessage::Chat { text } => assert_eq!(text, "/quiz math"),
      other => panic!("unexpected message: {other:?}"),
    }
  }

  #[test]
  fn server_reply_serializes_with_tag() {
    let out = serde_json::to_string(&ServerWsMessage::Reply {
      messages: vec!["Верно ✅".into()],
    })
    .expect("serialize");
    assert!(out.contains(r#""type":"reply""#));
    assert!(out.contains("Верно"));
  }
}
