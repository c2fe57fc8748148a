//! Built-in quiz topics. The bank merges these with any TOML-configured
//! topics so the bot is useful without external config.

use crate::domain::Question;

/// Default catalog: topic key (lowercase) plus its questions.
pub fn seed_topics() -> Vec<(String, Vec<Question>)> {
  vec![
    (
      "python".into(),
      vec![
        Question::new(
          "Как называется структура данных {1, 2, 3} в Python?",
          &["set", "множество"],
        ),
        Question::new("Какой оператор используется для создания функции?", &["def"]),
        Question::new(
          "Как называется ошибка деления на ноль?",
          &["zerodivisionerror", "zero division error"],
        ),
        Question::new("Какой тип у значения True?", &["bool", "boolean"]),
        Question::new("Как открыть файл для чтения?", &["open", "open()"]),
      ],
    ),
    (
      "math".into(),
      vec![
        Question::new("Чему равна производная x^2?", &["2x", "2*x"]),
        Question::new("Сколько градусов в развернутом угле?", &["180"]),
        Question::new(
          "Как называется число, делящееся только на 1 и на себя?",
          &["простое", "простое число", "prime"],
        ),
        Question::new("Чему равно 7*8?", &["56"]),
        Question::new(
          "Как называется корень квадратного уравнения?",
          &["корень", "roots", "root"],
        ),
      ],
    ),
    (
      "history".into(),
      vec![
        Question::new("В каком году началась Вторая мировая война?", &["1939"]),
        Question::new("Столица Франции?", &["париж", "paris"]),
        Question::new(
          "Кто был первым человеком в космосе (фамилия)?",
          &["гагарин", "gagarin"],
        ),
        Question::new("В каком году распался СССР?", &["1991"]),
        Question::new(
          "Как назывался древнеримский амфитеатр в Риме?",
          &["колизей", "colosseum", "coliseum"],
        ),
      ],
    ),
  ]
}
