//! Question bank: static catalog of topics with random sampling.
//!
//! Built once at startup from built-in seeds merged with the optional TOML
//! config. Topic keys are lowercase and unique; a topic with zero questions
//! (or a question with zero answers) is a config error and fails the load.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::info;

use crate::config::QuizConfig;
use crate::domain::Question;
use crate::seeds::seed_topics;
use crate::util::normalize;

#[derive(Debug, Error)]
pub enum BankError {
  #[error("topic '{0}' has no questions")]
  EmptyTopic(String),

  #[error("question '{0}' has no accepted answers")]
  NoAnswers(String),
}

pub struct QuestionBank {
  topics: BTreeMap<String, Vec<Question>>,
}

impl QuestionBank {
  /// Build the catalog: built-in seeds first, then config topics merged in
  /// (config questions extend a seed topic of the same name).
  pub fn new(config: Option<&QuizConfig>) -> Result<Self, BankError> {
    let mut topics: BTreeMap<String, Vec<Question>> = BTreeMap::new();
    for (key, questions) in seed_topics() {
      topics.insert(key.to_lowercase(), questions);
    }

    if let Some(cfg) = config {
      for t in &cfg.topics {
        let key = t.name.trim().to_lowercase();
        let entry = topics.entry(key).or_default();
        for q in &t.questions {
          entry.push(Question {
            text: q.text.clone(),
            answers: q.answers.iter().cloned().collect(),
          });
        }
      }
    }

    for (key, questions) in &topics {
      if questions.is_empty() {
        return Err(BankError::EmptyTopic(key.clone()));
      }
      for q in questions {
        if q.answers.is_empty() {
          return Err(BankError::NoAnswers(q.text.clone()));
        }
      }
      info!(target: "quiz", topic = %key, questions = questions.len(), "Startup quiz inventory");
    }

    Ok(Self { topics })
  }

  /// Sorted topic keys, stable across calls. Shown to users and used to
  /// validate `/quiz <topic>` arguments.
  pub fn available_topics(&self) -> Vec<&str> {
    self.topics.keys().map(String::as_str).collect()
  }

  /// Sample `count` distinct questions from a topic, shuffled per call.
  ///
  /// Unknown topic (trimmed, case-insensitive) yields an empty Vec. `count`
  /// is clamped to `1..=topic size`; there is no cross-call "used questions"
  /// memory, so repeats across sessions are expected.
  pub fn pick_questions<R: Rng>(&self, topic: &str, count: usize, rng: &mut R) -> Vec<Question> {
    let key = topic.trim().to_lowercase();
    let Some(pool) = self.topics.get(&key) else {
      return Vec::new();
    };
    let mut questions = pool.clone();
    questions.shuffle(rng);
    questions.truncate(count.clamp(1, questions.len()));
    questions
  }
}

/// True iff the normalized answer equals any normalized accepted answer.
/// No partial credit, no fuzzy matching.
pub fn check_answer(question: &Question, user_answer: &str) -> bool {
  let ua = normalize(user_answer);
  question.answers.iter().any(|a| normalize(a) == ua)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{QuestionCfg, TopicCfg};
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn bank() -> QuestionBank {
    QuestionBank::new(None).expect("seed bank")
  }

  #[test]
  fn topics_are_sorted_and_stable() {
    let b = bank();
    assert_eq!(b.available_topics(), vec!["history", "math", "python"]);
    assert_eq!(b.available_topics(), b.available_topics());
  }

  #[test]
  fn unknown_topic_yields_empty() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(bank().pick_questions("nonexistent-topic", 3, &mut rng).is_empty());
  }

  #[test]
  fn topic_lookup_is_case_insensitive_and_trimmed() {
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(bank().pick_questions("  MaTh ", 3, &mut rng).len(), 3);
  }

  #[test]
  fn count_is_clamped_to_topic_bounds() {
    let b = bank();
    let mut rng = StdRng::seed_from_u64(2);
    assert_eq!(b.pick_questions("math", 0, &mut rng).len(), 1);
    assert_eq!(b.pick_questions("math", 100, &mut rng).len(), 5);
  }

  #[test]
  fn sampling_is_without_replacement() {
    let b = bank();
    let mut rng = StdRng::seed_from_u64(3);
    let picked = b.pick_questions("python", 5, &mut rng);
    for (i, q) in picked.iter().enumerate() {
      assert!(!picked[i + 1..].contains(q), "duplicate question sampled");
    }
  }

  #[test]
  fn sampling_is_deterministic_under_a_seed() {
    let b = bank();
    let a = b.pick_questions("history", 3, &mut StdRng::seed_from_u64(7));
    let c = b.pick_questions("history", 3, &mut StdRng::seed_from_u64(7));
    assert_eq!(a, c);
  }

  #[test]
  fn every_accepted_answer_passes_check_under_noise() {
    let b = bank();
    for topic in b.available_topics() {
      let qs = b
        .topics
        .get(topic)
        .expect("topic present")
        .clone();
      for q in qs {
        for a in &q.answers {
          assert!(check_answer(&q, a));
          assert!(check_answer(&q, &format!("  {}  ", a.to_uppercase())));
        }
      }
    }
  }

  #[test]
  fn wrong_answer_fails_check() {
    let q = Question::new("Чему равно 7*8?", &["56"]);
    assert!(!check_answer(&q, "54"));
    assert!(!check_answer(&q, ""));
  }

  #[test]
  fn config_topics_merge_into_catalog() {
    let cfg = QuizConfig {
      topics: vec![TopicCfg {
        name: "Geo".into(),
        questions: vec![QuestionCfg {
          text: "Столица Японии?".into(),
          answers: vec!["токио".into(), "tokyo".into()],
        }],
      }],
    };
    let b = QuestionBank::new(Some(&cfg)).expect("bank");
    assert_eq!(b.available_topics(), vec!["geo", "history", "math", "python"]);
  }

  #[test]
  fn empty_config_topic_is_a_load_error() {
    let cfg = QuizConfig {
      topics: vec![TopicCfg { name: "empty".into(), questions: vec![] }],
    };
    assert!(matches!(
      QuestionBank::new(Some(&cfg)),
      Err(BankError::EmptyTopic(t)) if t == "empty"
    ));
  }

  #[test]
  fn answerless_question_is_a_load_error() {
    let cfg = QuizConfig {
      topics: vec![TopicCfg {
        name: "broken".into(),
        questions: vec![QuestionCfg { text: "???".into(), answers: vec![] }],
      }],
    };
    assert!(matches!(QuestionBank::new(Some(&cfg)), Err(BankError::NoAnswers(_))));
  }
}
