//! Reference grading policy used by the in-memory gateway.
//!
//! Mirrors what the backend does when it grades a submission so local runs and
//! tests see realistic correctness values.

use quiz_core::model::{Card, CardKind};
use unicode_normalization::UnicodeNormalization;

const TRUTHY: &[&str] = &["true", "t", "yes", "1", "正", "○"];

/// Returns whether `user_answer` is a correct response to `card`.
#[must_use]
pub fn evaluate_answer(card: &Card, user_answer: &str) -> bool {
    let user = normalize(user_answer);
    if user.is_empty() {
        return false;
    }
    let correct = normalize(&card.answer);

    match card.kind {
        CardKind::TrueFalse => is_truthy(&user) == is_truthy(&correct),
        CardKind::Mcq => {
            let offered = card
                .choices()
                .iter()
                .any(|choice| choice.trim().to_lowercase() == user);
            offered && user == correct
        }
        CardKind::Cloze => fold_width(&user) == fold_width(&correct),
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn is_truthy(value: &str) -> bool {
    TRUTHY.contains(&value)
}

/// NFKC folds full-width forms onto their ASCII counterparts.
fn fold_width(value: &str) -> String {
    value.nfkc().collect::<String>().trim().to_lowercase()
}
