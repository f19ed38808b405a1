use serde::{Deserialize, Serialize};

use crate::model::ids::{CardId, QuizId};

/// A captured response for one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub card_id: CardId,
    pub user_answer: String,
    pub time_sec: u32,
}

/// Outbound payload for the grading call.
///
/// Card ids are unique and a subset of the quiz's item card ids; items the
/// user never answered are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub quiz_id: QuizId,
    pub answers: Vec<SubmittedAnswer>,
}

impl QuizSubmission {
    #[must_use]
    pub fn answer_for(&self, card_id: CardId) -> Option<&SubmittedAnswer> {
        self.answers.iter().find(|answer| answer.card_id == card_id)
    }

    #[must_use]
    pub fn contains(&self, card_id: CardId) -> bool {
        self.answer_for(card_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_matches_backend_schema() {
        let submission = QuizSubmission {
            quiz_id: QuizId::new(2),
            answers: vec![SubmittedAnswer {
                card_id: CardId::new(5),
                user_answer: "B".into(),
                time_sec: 4,
            }],
        };
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "quiz_id": 2,
                "answers": [{"card_id": 5, "user_answer": "B", "time_sec": 4}]
            })
        );
        assert!(submission.contains(CardId::new(5)));
        assert!(!submission.contains(CardId::new(6)));
    }
}
