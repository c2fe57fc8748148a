//! SQLite persistence: user notes and aggregate quiz statistics.
//!
//! The quiz core only depends on the `StatsSink` trait; the chat router also
//! uses `NotesRepo`. Both are implemented by `SqliteStore` over one pool.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::info;

use crate::domain::{CompletionRecord, Note, QuizStats};

#[derive(Debug, Error)]
pub enum StorageError {
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),
}

/// Durable aggregate quiz counters keyed by user identity.
/// `record_completion` is additive: totals only ever grow.
#[async_trait]
pub trait StatsSink: Send + Sync {
  async fn record_completion(&self, record: &CompletionRecord) -> Result<(), StorageError>;
  async fn quiz_stats(&self, user_id: i64) -> Result<QuizStats, StorageError>;
}

/// Per-user note CRUD.
#[async_trait]
pub trait NotesRepo: Send + Sync {
  async fn add_note(&self, user_id: i64, text: &str) -> Result<i64, StorageError>;
  async fn list_notes(&self, user_id: i64, limit: i64) -> Result<Vec<Note>, StorageError>;
  async fn delete_note(&self, user_id: i64, note_id: i64) -> Result<bool, StorageError>;
  async fn count_notes(&self, user_id: i64) -> Result<i64, StorageError>;
}

pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Open (creating if missing) the SQLite file and run the schema setup.
  pub async fn connect(path: &Path) -> Result<Self, StorageError> {
    let options = SqliteConnectOptions::new()
      .filename(path)
      .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    let store = Self { pool };
    store.migrate().await?;
    info!(target: "student_helper", path = %path.display(), "SQLite storage ready");
    Ok(store)
  }

  /// In-memory database for tests. One connection, or every checkout would
  /// see its own empty database.
  pub async fn in_memory() -> Result<Self, StorageError> {
    let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .connect("sqlite::memory:")
      .await?;
    let store = Self { pool };
    store.migrate().await?;
    Ok(store)
  }

  async fn migrate(&self) -> Result<(), StorageError> {
    sqlx::query(
      r"
        CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            text TEXT NOT NULL
        );
      ",
    )
    .execute(&self.pool)
    .await?;

    sqlx::query(
      r"
        CREATE TABLE IF NOT EXISTS quiz_stats (
            user_id INTEGER PRIMARY KEY,
            quizzes_total INTEGER NOT NULL,
            questions_total INTEGER NOT NULL,
            correct_total INTEGER NOT NULL,
            last_topic TEXT
        );
      ",
    )
    .execute(&self.pool)
    .await?;

    Ok(())
  }
}

#[async_trait]
impl StatsSink for SqliteStore {
  async fn record_completion(&self, record: &CompletionRecord) -> Result<(), StorageError> {
    sqlx::query(
      r"
        INSERT INTO quiz_stats (user_id, quizzes_total, questions_total, correct_total, last_topic)
        VALUES (?1, 1, ?2, ?3, ?4)
        ON CONFLICT(user_id) DO UPDATE SET
            quizzes_total = quizzes_total + 1,
            questions_total = questions_total + excluded.questions_total,
            correct_total = correct_total + excluded.correct_total,
            last_topic = excluded.last_topic
      ",
    )
    .bind(record.user_id)
    .bind(i64::from(record.questions_answered))
    .bind(i64::from(record.correct))
    .bind(&record.topic)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn quiz_stats(&self, user_id: i64) -> Result<QuizStats, StorageError> {
    let row = sqlx::query(
      r"
        SELECT quizzes_total, questions_total, correct_total, last_topic
        FROM quiz_stats
        WHERE user_id = ?1
      ",
    )
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await?;

    let Some(row) = row else {
      return Ok(QuizStats::default());
    };
    Ok(QuizStats {
      quizzes_total: row.try_get("quizzes_total")?,
      questions_total: row.try_get("questions_total")?,
      correct_total: row.try_get("correct_total")?,
      last_topic: row.try_get("last_topic")?,
    })
  }
}

#[async_trait]
impl NotesRepo for SqliteStore {
  async fn add_note(&self, user_id: i64, text: &str) -> Result<i64, StorageError> {
    let now: DateTime<Utc> = Utc::now();
    let res = sqlx::query("INSERT INTO notes (user_id, created_at, text) VALUES (?1, ?2, ?3)")
      .bind(user_id)
      .bind(now)
      .bind(text)
      .execute(&self.pool)
      .await?;
    Ok(res.last_insert_rowid())
  }

  async fn list_notes(&self, user_id: i64, limit: i64) -> Result<Vec<Note>, StorageError> {
    let rows = sqlx::query(
      r"
        SELECT id, created_at, text
        FROM notes
        WHERE user_id = ?1
        ORDER BY id DESC
        LIMIT ?2
      ",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(&self.pool)
    .await?;

    let mut notes = Vec::with_capacity(rows.len());
    for row in &rows {
      notes.push(Note {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        text: row.try_get("text")?,
      });
    }
    Ok(notes)
  }

  async fn delete_note(&self, user_id: i64, note_id: i64) -> Result<bool, StorageError> {
    let res = sqlx::query("DELETE FROM notes WHERE user_id = ?1 AND id = ?2")
      .bind(user_id)
      .bind(note_id)
      .execute(&self.pool)
      .await?;
    Ok(res.rows_affected() > 0)
  }

  async fn count_notes(&self, user_id: i64) -> Result<i64, StorageError> {
    let row = sqlx::query("SELECT COUNT(*) AS c FROM notes WHERE user_id = ?1")
      .bind(user_id)
      .fetch_one(&self.pool)
      .await?;
    Ok(row.try_get("c")?)
  }
}
