//! Digit extraction from free-form model output.
//!
//! The model is asked to answer with "only a digit", but the completion is
//! free text. This is the single highest-fragility seam in the pipeline, so
//! it lives here as one pure function with its own test matrix.

use regex::Regex;
use std::sync::OnceLock;

static DIGIT_RUN: OnceLock<Regex> = OnceLock::new();

/// Return the first run of decimal digits in `text`, verbatim.
///
/// The run is not validated against the actual option count, and an
/// unrelated number earlier in the text wins over the intended answer.
pub fn extract_digit(text: &str) -> Option<&str> {
    let pattern = DIGIT_RUN.get_or_init(|| Regex::new(r"\d+").expect("digit pattern compiles"));
    pattern.find(text).map(|found| found.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_digit() {
        assert_eq!(extract_digit("3 - годы совпадают"), Some("3"));
    }

    #[test]
    fn digit_mid_sentence() {
        assert_eq!(extract_digit("Правильный вариант: 2, потому что..."), Some("2"));
    }

    #[test]
    fn no_digits() {
        assert_eq!(extract_digit("ответ неизвестен"), None);
        assert_eq!(extract_digit(""), None);
    }

    #[test]
    fn first_of_multiple_runs_wins() {
        assert_eq!(extract_digit("вариант 1 или вариант 2"), Some("1"));
    }

    #[test]
    fn full_run_returned_verbatim() {
        assert_eq!(extract_digit("основан в 1900 году"), Some("1900"));
    }

    #[test]
    fn digit_embedded_in_word() {
        assert_eq!(extract_digit("вариант№3подходит"), Some("3"));
    }

    // Known fragility, kept on purpose: an unrelated earlier number shadows
    // the intended answer.
    #[test]
    fn unrelated_earlier_number_shadows_answer() {
        assert_eq!(
            extract_digit("Из 4 вариантов правильный - 2"),
            Some("4")
        );
    }

    #[test]
    fn idempotent_on_own_output() {
        let first = extract_digit("ответ: 42, проверено").unwrap();
        assert_eq!(extract_digit(first), Some(first));
    }
}
