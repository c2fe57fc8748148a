//! Small text helpers used across modules.

/// Reduce a free-text answer to its canonical comparable form.
///
/// Trims, lowercases, then keeps only alphanumerics plus `*` and `^`
/// (some accepted answers encode exponents, e.g. "2x" / "2*x").
/// Unicode-aware: Cyrillic answers survive intact. Total and idempotent.
pub fn normalize(s: &str) -> String {
  s.trim()
    .to_lowercase()
    .chars()
    .filter(|c| c.is_alphanumeric() || matches!(c, '*' | '^'))
    .collect()
}

/// Join reply lines into one chat message, trimming outer whitespace.
pub fn join_lines(lines: &[String]) -> String {
  lines.join("\n").trim().to_string()
}

/// Soft truncation for outbound chat messages.
/// Chat platforms cap message length; cut gently instead of erroring.
pub fn clamp(text: &str, max_chars: usize) -> String {
  if text.chars().count() <= max_chars {
    return text.to_string();
  }
  let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
  format!("{}...", cut)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_strips_case_whitespace_and_punctuation() {
    assert_eq!(normalize("  Zero Division Error! "), "zerodivisionerror");
    assert_eq!(normalize("open()"), "open");
    assert_eq!(normalize("2*x"), "2*x");
    assert_eq!(normalize("x^2"), "x^2");
  }

  #[test]
  fn normalize_keeps_cyrillic() {
    assert_eq!(normalize("  ПрОстое чИсло. "), "простоечисло");
    assert_eq!(normalize("Гагарин"), "гагарин");
  }

  #[test]
  fn normalize_is_total_and_idempotent() {
    for s in ["", "   ", "56", "Стоп!", "x ^ 2", "a-b_c"] {
      let once = normalize(s);
      assert_eq!(normalize(&once), once);
    }
    assert_eq!(normalize("   "), "");
  }

  #[test]
  fn clamp_counts_chars_not_bytes() {
    let s = "привет".repeat(10);
    let cut = clamp(&s, 10);
    assert_eq!(cut.chars().count(), 10);
    assert!(cut.ends_with("..."));
    assert_eq!(clamp("short", 10), "short");
  }
}
