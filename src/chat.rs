//! Chat command router shared by the WebSocket and HTTP transports.
//!
//! Commands start with `/`; anything else is routed into the user's active
//! quiz session (and silently ignored when there is none). Every handler
//! returns the list of outbound messages for the transport to render.

use chrono::SecondsFormat;
use tracing::{error, info, instrument};

use crate::domain::CompletionRecord;
use crate::session::{QuizSession, SubmitOutcome};
use crate::state::AppState;
use crate::util::{clamp, join_lines};
use crate::weather::describe_weather_code;

/// Questions per quiz, matching the original bot.
const QUIZ_QUESTION_COUNT: usize = 3;

/// Dispatch one inbound chat message for a user.
#[instrument(level = "info", skip(state, text), fields(text_len = text.len()))]
pub async fn handle_chat(state: &AppState, user_id: i64, text: &str) -> Vec<String> {
  let trimmed = text.trim();
  let Some(rest) = trimmed.strip_prefix('/') else {
    // Plain text: only meaningful inside a quiz session.
    return on_inbound_text(state, user_id, trimmed).await.unwrap_or_default();
  };

  let mut parts = rest.split_whitespace();
  let command = parts.next().unwrap_or("").to_lowercase();
  let args: Vec<&str> = parts.collect();

  match command.as_str() {
    "start" => cmd_start(state),
    "help" => cmd_help(state),
    "note" => cmd_note(state, user_id, &args).await,
    "weather" => cmd_weather(state, &args).await,
    "quiz" => on_quiz_start(state, user_id, args.first().copied()).await,
    "stats" => cmd_stats(state, user_id).await,
    _ => vec!["Неизвестная команда. Напиши /help, чтобы увидеть список.".into()],
  }
}

/// Begin a quiz: validate the topic, sample questions, store the session,
/// and return the intro plus the first prompt.
pub async fn on_quiz_start(state: &AppState, user_id: i64, raw_topic: Option<&str>) -> Vec<String> {
  let topics = state.bank.available_topics().join(", ");

  let Some(raw_topic) = raw_topic else {
    return vec![format!("Укажи тему: /quiz <тема>\nДоступно: {}", topics)];
  };
  let topic = raw_topic.trim().to_lowercase();

  // Sample before the first await so the thread-local rng never crosses it.
  let questions = {
    let mut rng = rand::thread_rng();
    state.bank.pick_questions(&topic, QUIZ_QUESTION_COUNT, &mut rng)
  };
  if questions.is_empty() {
    return vec![format!("Не знаю такую тему.\nДоступно: {}", topics)];
  }

  let session = match QuizSession::start(user_id, &topic, questions) {
    Ok(s) => s,
    Err(e) => {
      error!(target: "quiz", user_id, %topic, error = %e, "Failed to start quiz session");
      return vec!["Викторина сейчас недоступна. Попробуй позже.".into()];
    }
  };

  let intro = format!(
    "Викторина по теме: {}\nОтвечай обычным сообщением. Чтобы остановиться — напиши: стоп",
    topic
  );
  let prompt = format!(
    "Вопрос 1/{}: {}",
    session.total(),
    session.current_question().unwrap_or_default()
  );
  info!(target: "quiz", user_id, %topic, total = session.total(), "Quiz started");
  state.sessions.put(session).await;

  vec![intro, prompt]
}

/// Route plain text into the user's quiz session. `None` means "no active
/// session" and the transport sends nothing back.
pub async fn on_inbound_text(state: &AppState, user_id: i64, raw: &str) -> Option<Vec<String>> {
  let outcome = state.sessions.submit(user_id, raw).await?;

  let mut messages = Vec::new();
  match outcome {
    SubmitOutcome::Next { correct, example, question, position, total } => {
      messages.push(verdict(correct, example));
      messages.push(format!("Вопрос {}/{}: {}", position, total, question));
    }
    SubmitOutcome::Finished { correct, example, percent, record } => {
      messages.push(verdict(correct, example));
      flush_record(state, &record).await;
      messages.push(join_lines(&[
        "Викторина завершена!".into(),
        format!("Результат: {}/{} ({:.1}%)", record.correct, record.questions_answered, percent),
        "Статистика обновлена. Посмотри: /stats".into(),
      ]));
    }
    SubmitOutcome::Cancelled { record } => {
      if let Some(record) = &record {
        flush_record(state, record).await;
      }
      messages.push("Ок, остановил викторину.".into());
    }
  }
  Some(messages)
}

fn verdict(correct: bool, example: Option<String>) -> String {
  if correct {
    "Верно ✅".into()
  } else {
    format!(
      "Не совсем ❌ Пример правильного ответа: {}",
      example.unwrap_or_else(|| "—".into())
    )
  }
}

/// Hand the completion off to the stats sink. Sink failure is logged and the
/// chat reply still goes out; retry policy is the sink's concern.
async fn flush_record(state: &AppState, record: &CompletionRecord) {
  match state.stats.record_completion(record).await {
    Ok(()) => info!(
      target: "quiz",
      user_id = record.user_id,
      topic = %record.topic,
      answered = record.questions_answered,
      correct = record.correct,
      "Quiz completion recorded"
    ),
    Err(e) => error!(
      target: "quiz",
      user_id = record.user_id,
      error = %e,
      "Failed to persist quiz stats"
    ),
  }
}

fn cmd_start(state: &AppState) -> Vec<String> {
  let topics = state.bank.available_topics().join(", ");
  vec![join_lines(&[
    "Привет!".into(),
    "".into(),
    "Я Student Helper Bot: заметки, мини-викторины и погода.".into(),
    "".into(),
    "Быстрый старт:".into(),
    "— /note add Купить тетрадь по матану;".into(),
    "— /note list;".into(),
    "— /quiz python;".into(),
    "— /weather Berlin;".into(),
    "— /stats;".into(),
    "".into(),
    format!("Темы викторины: {}", topics),
    "".into(),
    "Напиши /help, чтобы увидеть все команды.".into(),
  ])]
}

fn cmd_help(state: &AppState) -> Vec<String> {
  let topics = state.bank.available_topics().join(", ");
  vec![join_lines(&[
    "Команды бота:".into(),
    "".into(),
    "/start — приветствие и инструкция;".into(),
    "/help — список команд;".into(),
    "".into(),
    "/note add <текст> — добавить заметку;".into(),
    "/note list — показать последние 10 заметок;".into(),
    "/note del <id> — удалить заметку по id;".into(),
    "".into(),
    format!("/quiz <тема> — мини-викторина (темы: {});", topics),
    "/weather <город> — текущая погода (Open-Meteo);".into(),
    "/stats — ваша статистика (заметки + викторины);".into(),
  ])]
}

async fn cmd_note(state: &AppState, user_id: i64, args: &[&str]) -> Vec<String> {
  let usage = "Использование:\n/note add <текст>\n/note list\n/note del <id>";
  let Some(sub) = args.first() else {
    return vec![usage.into()];
  };

  match sub.to_lowercase().as_str() {
    "add" => {
      let text = args[1..].join(" ");
      if text.trim().is_empty() {
        return vec!["Добавление заметки: /note add <текст>".into()];
      }
      match state.notes.add_note(user_id, text.trim()).await {
        Ok(id) => vec![format!("Заметка добавлена: id={}", id)],
        Err(e) => {
          error!(target: "student_helper", user_id, error = %e, "Failed to add note");
          vec!["Ошибка при сохранении заметки. Попробуй позже.".into()]
        }
      }
    }
    "list" => match state.notes.list_notes(user_id, 10).await {
      Ok(notes) if notes.is_empty() => {
        vec!["Заметок пока нет. Добавь: /note add <текст>".into()]
      }
      Ok(notes) => {
        let mut lines = vec!["Последние заметки:".to_string()];
        for n in &notes {
          let ts = n.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
          lines.push(format!("{}) {}  [{}]", n.id, n.text, ts));
        }
        // Chat platforms cap message length; cut long note lists softly.
        vec![clamp(&join_lines(&lines), 3500)]
      }
      Err(e) => {
        error!(target: "student_helper", user_id, error = %e, "Failed to list notes");
        vec!["Ошибка при чтении заметок. Попробуй позже.".into()]
      }
    },
    "del" => {
      let Some(raw_id) = args.get(1) else {
        return vec!["Удаление: /note del <id>".into()];
      };
      let Ok(note_id) = raw_id.parse::<i64>() else {
        return vec!["id должен быть числом. Пример: /note del 3".into()];
      };
      match state.notes.delete_note(user_id, note_id).await {
        Ok(true) => vec!["Удалено.".into()],
        Ok(false) => vec!["Не найдено (проверь id).".into()],
        Err(e) => {
          error!(target: "student_helper", user_id, error = %e, "Failed to delete note");
          vec!["Ошибка при удалении заметки. Попробуй позже.".into()]
        }
      }
    }
    _ => vec!["Неизвестная подкоманда. Используй: add, list или del.".into()],
  }
}

async fn cmd_weather(state: &AppState, args: &[&str]) -> Vec<String> {
  if args.is_empty() {
    return vec!["Использование: /weather <город>\nПример: /weather Berlin".into()];
  }
  let city = args.join(" ");

  let geo = match state.weather.geocode_city(&city).await {
    Ok(Some(geo)) => geo,
    Ok(None) => return vec!["Не нашёл такой город. Попробуй другой вариант написания.".into()],
    Err(e) => {
      error!(target: "student_helper", %city, error = %e, "Geocoding request failed");
      return vec!["Ошибка сети при запросе погоды. Попробуй чуть позже.".into()];
    }
  };

  match state.weather.current_weather(geo.latitude, geo.longitude).await {
    Ok(w) => vec![join_lines(&[
      format!("Погода сейчас: {} ({})", geo.name, geo.country),
      format!("Температура: {:.1}°C", w.temperature_c),
      format!("Ветер: {:.1} км/ч", w.wind_kmh),
      format!("Состояние: {}", describe_weather_code(w.weather_code)),
    ])],
    Err(e) => {
      error!(target: "student_helper", %city, error = %e, "Weather request failed");
      vec!["Ошибка сети при запросе погоды. Попробуй чуть позже.".into()]
    }
  }
}

async fn cmd_stats(state: &AppState, user_id: i64) -> Vec<String> {
  let notes_cnt = match state.notes.count_notes(user_id).await {
    Ok(c) => c,
    Err(e) => {
      error!(target: "student_helper", user_id, error = %e, "Failed to count notes");
      return vec!["Ошибка при чтении статистики. Попробуй позже.".into()];
    }
  };
  let qs = match state.stats.quiz_stats(user_id).await {
    Ok(qs) => qs,
    Err(e) => {
      error!(target: "student_helper", user_id, error = %e, "Failed to read quiz stats");
      return vec!["Ошибка при чтении статистики. Попробуй позже.".into()];
    }
  };

  let accuracy = if qs.questions_total > 0 {
    (qs.correct_total as f64 / qs.questions_total as f64 * 1000.0).round() / 10.0
  } else {
    0.0
  };

  vec![join_lines(&[
    "Твоя статистика:".into(),
    format!("Заметок: {}", notes_cnt),
    format!("Викторин пройдено: {}", qs.quizzes_total),
    format!("Вопросов всего: {}", qs.questions_total),
    format!("Правильных ответов: {}", qs.correct_total),
    format!("Точность: {:.1}%", accuracy),
    format!("Последняя тема: {}", qs.last_topic.as_deref().unwrap_or("—")),
  ])]
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;
  use std::time::Duration;

  use super::*;
  use crate::bank::QuestionBank;
  use crate::domain::Question;
  use crate::storage::SqliteStore;
  use crate::weather::WeatherClient;

  async fn test_state() -> AppState {
    let store = Arc::new(SqliteStore::in_memory().await.expect("store"));
    AppState::new(
      QuestionBank::new(None).expect("bank"),
      store.clone(),
      store,
      WeatherClient::new(Duration::from_secs(1)),
    )
  }

  async fn put_math_session(state: &AppState, user_id: i64) {
    let questions = vec![
      Question::new("Чему равно 7*8?", &["56"]),
      Question::new("Сколько градусов в развернутом угле?", &["180"]),
    ];
    let session = QuizSession::start(user_id, "math", questions).expect("session");
    state.sessions.put(session).await;
  }

  #[tokio::test]
  async fn quiz_without_topic_lists_topics() {
    let state = test_state().await;
    let replies = handle_chat(&state, 1, "/quiz").await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("Укажи тему"));
    assert!(replies[0].contains("history, math, python"));
  }

  #[tokio::test]
  async fn quiz_with_unknown_topic_lists_topics() {
    let state = test_state().await;
    let replies = handle_chat(&state, 1, "/quiz biology").await;
    assert!(replies[0].contains("Не знаю такую тему"));
    assert!(replies[0].contains("history, math, python"));
    assert!(!state.sessions.is_active(1).await);
  }

  #[tokio::test]
  async fn quiz_start_stores_session_and_prompts_first_question() {
    let state = test_state().await;
    let replies = handle_chat(&state, 1, "/quiz MATH").await;
    assert_eq!(replies.len(), 2);
    assert!(replies[0].starts_with("Викторина по теме: math"));
    assert!(replies[1].starts_with("Вопрос 1/3: "));
    assert!(state.sessions.is_active(1).await);
  }

  #[tokio::test]
  async fn plain_text_without_session_is_ignored() {
    let state = test_state().await;
    assert!(handle_chat(&state, 1, "привет").await.is_empty());
  }

  #[tokio::test]
  async fn full_quiz_flow_records_stats() {
    let state = test_state().await;
    put_math_session(&state, 1).await;

    let replies = handle_chat(&state, 1, "56").await;
    assert_eq!(replies[0], "Верно ✅");
    assert!(replies[1].starts_with("Вопрос 2/2: "));

    let replies = handle_chat(&state, 1, "180").await;
    assert_eq!(replies[0], "Верно ✅");
    assert!(replies[1].contains("Результат: 2/2 (100.0%)"));
    assert!(!state.sessions.is_active(1).await);

    let stats = state.stats.quiz_stats(1).await.expect("stats");
    assert_eq!(stats.quizzes_total, 1);
    assert_eq!(stats.questions_total, 2);
    assert_eq!(stats.correct_total, 2);
    assert_eq!(stats.last_topic.as_deref(), Some("math"));
  }

  #[tokio::test]
  async fn wrong_answer_shows_example() {
    let state = test_state().await;
    put_math_session(&state, 1).await;
    let replies = handle_chat(&state, 1, "54").await;
    assert_eq!(replies[0], "Не совсем ❌ Пример правильного ответа: 56");
  }

  #[tokio::test]
  async fn cancel_before_progress_writes_no_stats() {
    let state = test_state().await;
    put_math_session(&state, 1).await;
    let replies = handle_chat(&state, 1, "стоп").await;
    assert_eq!(replies, vec!["Ок, остановил викторину.".to_string()]);
    assert!(!state.sessions.is_active(1).await);
    assert_eq!(state.stats.quiz_stats(1).await.expect("stats").quizzes_total, 0);
  }

  #[tokio::test]
  async fn cancel_after_progress_keeps_partial_stats() {
    let state = test_state().await;
    put_math_session(&state, 1).await;
    let _ = handle_chat(&state, 1, "56").await;
    let _ = handle_chat(&state, 1, "stop").await;

    let stats = state.stats.quiz_stats(1).await.expect("stats");
    assert_eq!(stats.quizzes_total, 1);
    assert_eq!(stats.questions_total, 1);
    assert_eq!(stats.correct_total, 1);
  }

  #[tokio::test]
  async fn note_add_list_del_flow() {
    let state = test_state().await;

    let replies = handle_chat(&state, 1, "/note add Купить кофе").await;
    assert_eq!(replies[0], "Заметка добавлена: id=1");

    let replies = handle_chat(&state, 1, "/note list").await;
    assert!(replies[0].starts_with("Последние заметки:"));
    assert!(replies[0].contains("1) Купить кофе"));

    assert_eq!(handle_chat(&state, 1, "/note del abc").await[0], "id должен быть числом. Пример: /note del 3");
    assert_eq!(handle_chat(&state, 1, "/note del 1").await[0], "Удалено.");
    assert_eq!(handle_chat(&state, 1, "/note del 1").await[0], "Не найдено (проверь id).");
    assert_eq!(handle_chat(&state, 1, "/note list").await[0], "Заметок пока нет. Добавь: /note add <текст>");
  }

  #[tokio::test]
  async fn note_without_args_shows_usage() {
    let state = test_state().await;
    let replies = handle_chat(&state, 1, "/note").await;
    assert!(replies[0].contains("/note add <текст>"));
  }

  #[tokio::test]
  async fn stats_render_totals_and_accuracy() {
    let state = test_state().await;
    put_math_session(&state, 1).await;
    let _ = handle_chat(&state, 1, "56").await;
    let _ = handle_chat(&state, 1, "нет").await;
    let _ = handle_chat(&state, 1, "/note add тест").await;

    let replies = handle_chat(&state, 1, "/stats").await;
    let text = &replies[0];
    assert!(text.contains("Заметок: 1"));
    assert!(text.contains("Викторин пройдено: 1"));
    assert!(text.contains("Вопросов всего: 2"));
    assert!(text.contains("Правильных ответов: 1"));
    assert!(text.contains("Точность: 50.0%"));
    assert!(text.contains("Последняя тема: math"));
  }

  #[tokio::test]
  async fn unknown_command_points_to_help() {
    let state = test_state().await;
    let replies = handle_chat(&state, 1, "/frobnicate").await;
    assert!(replies[0].contains("/help"));
  }

  #[tokio::test]
  async fn help_and_start_mention_topics() {
    let state = test_state().await;
    assert!(handle_chat(&state, 1, "/help").await[0].contains("history, math, python"));
    assert!(handle_chat(&state, 1, "/start").await[0].contains("Student Helper Bot"));
  }
}
