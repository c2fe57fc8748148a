//! Shared application state: question bank, session store, persistence
//! handles, and the weather client.

use std::sync::Arc;

use crate::bank::QuestionBank;
use crate::session::SessionStore;
use crate::storage::{NotesRepo, StatsSink};
use crate::weather::WeatherClient;

pub struct AppState {
  pub bank: QuestionBank,
  pub sessions: SessionStore,
  pub stats: Arc<dyn StatsSink>,
  pub notes: Arc<dyn NotesRepo>,
  pub weather: WeatherClient,
}

impl AppState {
  pub fn new(
    bank: QuestionBank,
    stats: Arc<dyn StatsSink>,
    notes: Arc<dyn NotesRepo>,
    weather: WeatherClient,
  ) -> Self {
    Self {
      bank,
      sessions: SessionStore::default(),
      stats,
      notes,
      weather,
    }
  }
}
