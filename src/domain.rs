//! Domain models shared by the quiz core, chat router, and storage.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One quiz question with its set of accepted answers.
///
/// Answers are kept in a `BTreeSet` so the "example answer" shown after an
/// incorrect reply is always the lexicographically smallest one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
  pub text: String,
  pub answers: BTreeSet<String>,
}

impl Question {
  pub fn new(text: &str, answers: &[&str]) -> Self {
    Self {
      text: text.to_string(),
      answers: answers.iter().map(|a| a.to_string()).collect(),
    }
  }
}

/// Durable summary handed to the stats sink when a session ends.
/// Produced at most once per session, then discarded by the core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionRecord {
  pub user_id: i64,
  pub topic: String,
  pub questions_answered: u32,
  pub correct: u32,
}

/// Aggregate per-user quiz counters as stored in `quiz_stats`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QuizStats {
  pub quizzes_total: i64,
  pub questions_total: i64,
  pub correct_total: i64,
  pub last_topic: Option<String>,
}

/// A saved user note.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Note {
  pub id: i64,
  pub created_at: DateTime<Utc>,
  pub text: String,
}
