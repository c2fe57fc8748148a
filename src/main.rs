//! Student Helper · Chat Backend
//!
//! - Axum HTTP + WebSocket chat API
//! - Notes, mini-quizzes, weather (Open-Meteo), and usage statistics
//! - SQLite persistence for notes and quiz stats
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   DB_PATH          : SQLite file path (default "student_helper.sqlite3")
//!   HTTP_TIMEOUT_SEC : outbound HTTP timeout (default 10)
//!   QUIZ_CONFIG_PATH : path to TOML config with extra quiz topics
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

mod bank;
mod chat;
mod config;
mod domain;
mod protocol;
mod routes;
mod seeds;
mod session;
mod state;
mod storage;
mod telemetry;
mod util;
mod weather;

use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::bank::QuestionBank;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::SqliteStore;
use crate::weather::WeatherClient;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let settings = config::load_settings();

  // Catalog misconfiguration (empty topic, answerless question) is fatal here
  // rather than at session start.
  let quiz_config = config::load_quiz_config_from_env();
  let bank = QuestionBank::new(quiz_config.as_ref())?;

  let store = Arc::new(SqliteStore::connect(&settings.db_path).await?);
  let weather = WeatherClient::new(settings.http_timeout);

  let state = Arc::new(AppState::new(bank, store.clone(), store, weather));
  let app = build_router(state);

  let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "student_helper", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
