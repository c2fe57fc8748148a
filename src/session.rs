//! Per-user quiz session state machine and the session store.
//!
//! A session is `Active` while its question queue is non-empty; it ends
//! `Finished` (queue exhausted) or `Cancelled` (stop token). Both terminal
//! outcomes evict the session from the store immediately, so external
//! callers can never submit an answer to a dead session.

use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;
use tracing::debug;

use crate::bank::{check_answer, BankError};
use crate::domain::{CompletionRecord, Question};

/// Words that abort a running quiz (trimmed, case-insensitive).
const STOP_TOKENS: [&str; 3] = ["стоп", "stop", "cancel"];

/// Result of feeding one inbound answer into a session.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
  /// The quiz continues: verdict for the answered question plus the next
  /// prompt (1-based position out of the session total).
  Next {
    correct: bool,
    example: Option<String>,
    question: String,
    position: u32,
    total: u32,
  },
  /// The last question was answered; the record must be flushed to stats.
  Finished {
    correct: bool,
    example: Option<String>,
    percent: f64,
    record: CompletionRecord,
  },
  /// Stop token received. `record` is present iff at least one question was
  /// already answered: partial progress still counts toward stats.
  Cancelled { record: Option<CompletionRecord> },
}

pub struct QuizSession {
  user_id: i64,
  topic: String,
  queue: VecDeque<Question>,
  score: u32,
  total: u32,
}

impl QuizSession {
  /// Start an `Active` session. The caller validates topic existence via the
  /// bank; an empty question list here means a misconfigured catalog.
  pub fn start(user_id: i64, topic: &str, questions: Vec<Question>) -> Result<Self, BankError> {
    if questions.is_empty() {
      return Err(BankError::EmptyTopic(topic.to_string()));
    }
    let total = questions.len() as u32;
    Ok(Self {
      user_id,
      topic: topic.to_string(),
      queue: questions.into(),
      score: 0,
      total,
    })
  }

  pub fn topic(&self) -> &str {
    &self.topic
  }

  pub fn total(&self) -> u32 {
    self.total
  }

  pub fn score(&self) -> u32 {
    self.score
  }

  /// Questions answered so far.
  pub fn answered(&self) -> u32 {
    self.total - self.queue.len() as u32
  }

  /// Text of the question currently awaiting an answer.
  pub fn current_question(&self) -> Option<&str> {
    self.queue.front().map(|q| q.text.as_str())
  }

  fn completion_record(&self, questions_answered: u32) -> CompletionRecord {
    CompletionRecord {
      user_id: self.user_id,
      topic: self.topic.clone(),
      questions_answered,
      correct: self.score,
    }
  }

  /// Consume one inbound answer and advance the machine.
  pub fn submit_answer(&mut self, raw: &str) -> SubmitOutcome {
    let trimmed = raw.trim().to_lowercase();
    if STOP_TOKENS.contains(&trimmed.as_str()) {
      let answered = self.answered();
      let record = (answered > 0).then(|| self.completion_record(answered));
      self.queue.clear();
      return SubmitOutcome::Cancelled { record };
    }

    // The store evicts terminal sessions, so the queue is non-empty for any
    // externally reachable session.
    let Some(question) = self.queue.pop_front() else {
      return SubmitOutcome::Cancelled { record: None };
    };

    let correct = check_answer(&question, raw);
    if correct {
      self.score += 1;
    }
    // Smallest accepted answer, shown as the example after a miss.
    let example = (!correct)
      .then(|| question.answers.iter().next().cloned())
      .flatten();

    if let Some(next) = self.queue.front() {
      SubmitOutcome::Next {
        correct,
        example,
        question: next.text.clone(),
        position: self.answered() + 1,
        total: self.total,
      }
    } else {
      let percent = if self.total == 0 {
        0.0
      } else {
        (f64::from(self.score) / f64::from(self.total) * 1000.0).round() / 10.0
      };
      SubmitOutcome::Finished {
        correct,
        example,
        percent,
        record: self.completion_record(self.total),
      }
    }
  }
}

/// Keyed holder of at most one active session per user.
///
/// All mutation happens under one write lock, which also serializes the
/// answer stream per user: a submit takes the lock, advances the machine,
/// and evicts terminal sessions before releasing it.
#[derive(Default)]
pub struct SessionStore {
  inner: RwLock<HashMap<i64, QuizSession>>,
}

impl SessionStore {
  /// Store a session, silently discarding any previous one for the user
  /// (starting a new quiz replaces the old single-flight session).
  pub async fn put(&self, session: QuizSession) {
    let mut map = self.inner.write().await;
    if map.insert(session.user_id, session).is_some() {
      debug!(target: "quiz", "Replaced an active session");
    }
  }

  pub async fn remove(&self, user_id: i64) {
    self.inner.write().await.remove(&user_id);
  }

  pub async fn is_active(&self, user_id: i64) -> bool {
    self.inner.read().await.contains_key(&user_id)
  }

  /// Route an inbound text to the user's session, if any. Terminal outcomes
  /// evict the session before the lock is released.
  pub async fn submit(&self, user_id: i64, raw: &str) -> Option<SubmitOutcome> {
    let mut map = self.inner.write().await;
    let session = map.get_mut(&user_id)?;
    let outcome = session.submit_answer(raw);
    if matches!(
      outcome,
      SubmitOutcome::Finished { .. } | SubmitOutcome::Cancelled { .. }
    ) {
      map.remove(&user_id);
    }
    Some(outcome)
  }
}
