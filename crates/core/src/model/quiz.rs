use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::card::{Card, CardError};
use crate::model::ids::{CardId, QuizId, QuizItemId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no items")]
    Empty,

    #[error("card {0} appears more than once in the quiz")]
    DuplicateCard(CardId),

    #[error("quiz item {item} references card {card_id} but embeds card {embedded}")]
    CardMismatch {
        item: QuizItemId,
        card_id: CardId,
        embedded: CardId,
    },

    #[error("quiz score must be within [0, 1]")]
    ScoreOutOfRange,

    #[error(transparent)]
    Card(#[from] CardError),
}

//
// ─── QUIZ ITEM ─────────────────────────────────────────────────────────────────
//

/// One card instance embedded in a specific quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub id: QuizItemId,
    pub card_id: CardId,
    pub card: Card,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
    /// Set by the grading collaborator only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_sec: Option<u32>,
}

impl QuizItem {
    /// Builds an ungraded item for `card`.
    #[must_use]
    pub fn new(id: QuizItemId, card: Card) -> Self {
        Self {
            id,
            card_id: card.id,
            card,
            user_answer: None,
            is_correct: None,
            time_sec: None,
        }
    }

    #[must_use]
    pub fn is_graded(&self) -> bool {
        self.is_correct.is_some()
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// Ordered, fixed-length sequence of quiz items representing one attempt.
///
/// Presentation order is `quiz_items` order and never changes mid-session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub completed: bool,
    /// Fraction in `[0, 1]`, present once graded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub quiz_items: Vec<QuizItem>,
}

impl Quiz {
    #[must_use]
    pub fn len(&self) -> usize {
        self.quiz_items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quiz_items.is_empty()
    }

    #[must_use]
    pub fn item(&self, index: usize) -> Option<&QuizItem> {
        self.quiz_items.get(index)
    }

    /// Card ids in presentation order.
    pub fn card_ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.quiz_items.iter().map(|item| item.card_id)
    }

    #[must_use]
    pub fn contains_card(&self, card_id: CardId) -> bool {
        self.quiz_items.iter().any(|item| item.card_id == card_id)
    }

    /// Checks structural invariants of a fetched or graded quiz.
    ///
    /// An empty quiz is structurally valid here; callers that need at least one
    /// item check `is_empty` themselves.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` for invalid cards, mismatched or duplicate card ids,
    /// and scores outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), QuizError> {
        if let Some(score) = self.score {
            if !(0.0..=1.0).contains(&score) {
                return Err(QuizError::ScoreOutOfRange);
            }
        }

        let mut seen = HashSet::with_capacity(self.quiz_items.len());
        for item in &self.quiz_items {
            if item.card_id != item.card.id {
                return Err(QuizError::CardMismatch {
                    item: item.id,
                    card_id: item.card_id,
                    embedded: item.card.id,
                });
            }
            if !seen.insert(item.card_id) {
                return Err(QuizError::DuplicateCard(item.card_id));
            }
            item.card.validate()?;
        }
        Ok(())
    }
}

/// The scheduler-selected quiz for today, with streak context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyQuiz {
    pub quiz: Quiz,
    pub remaining_count: u32,
    pub streak_days: u32,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
