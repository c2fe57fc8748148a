//! Environment-based settings plus an optional TOML quiz-bank extension.
//!
//! Env variables:
//!   PORT             : u16 (default 3000)
//!   DB_PATH          : SQLite file path (default "student_helper.sqlite3")
//!   HTTP_TIMEOUT_SEC : outbound HTTP timeout in seconds (default 10)
//!   QUIZ_CONFIG_PATH : path to a TOML file with extra quiz topics

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug)]
pub struct Settings {
  pub port: u16,
  pub db_path: PathBuf,
  pub http_timeout: Duration,
}

pub fn load_settings() -> Settings {
  let port = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .unwrap_or(3000);

  let db_path = std::env::var("DB_PATH")
    .map(PathBuf::from)
    .unwrap_or_else(|_| PathBuf::from("student_helper.sqlite3"));

  let timeout_sec = std::env::var("HTTP_TIMEOUT_SEC")
    .ok()
    .and_then(|t| t.parse::<f64>().ok())
    .unwrap_or(10.0);

  Settings {
    port,
    db_path,
    http_timeout: Duration::from_secs_f64(timeout_sec),
  }
}

/// Extra quiz topics accepted in TOML configuration.
///
/// ```toml
/// [[topics]]
/// name = "geography"
/// [[topics.questions]]
/// text = "Столица Японии?"
/// answers = ["токио", "tokyo"]
/// ```
#[derive(Clone, Debug, Deserialize, Default)]
pub struct QuizConfig {
  #[serde(default)]
  pub topics: Vec<TopicCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TopicCfg {
  pub name: String,
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  pub text: String,
  pub answers: Vec<String>,
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any parsing/IO
/// error, returns None and the bank runs on built-in seeds only.
pub fn load_quiz_config_from_env() -> Option<QuizConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<QuizConfig>(&s) {
      Ok(cfg) => {
        info!(target: "student_helper", %path, topics = cfg.topics.len(), "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "student_helper", %path, error = %e, "Failed to parse TOML quiz config");
        None
      }
    },
    Err(e) => {
      error!(target: "student_helper", %path, error = %e, "Failed to read TOML quiz config file");
      None
    }
  }
}
