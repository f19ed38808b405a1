use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CardId, NoteId, UserId};

//
// ─── CARD KIND ─────────────────────────────────────────────────────────────────
//

/// Question format of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    /// Multiple choice; the answer is one of `choices`.
    #[serde(rename = "mcq")]
    Mcq,
    /// True/false; the answer is `"true"` or `"false"`.
    #[serde(rename = "tf")]
    TrueFalse,
    /// Fill in the blank; free text answer.
    #[serde(rename = "cloze")]
    Cloze,
}

impl CardKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CardKind::Mcq => "mcq",
            CardKind::TrueFalse => "tf",
            CardKind::Cloze => "cloze",
        }
    }
}

//
// ─── CARD ──────────────────────────────────────────────────────────────────────
//

/// A single quiz question as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub user_id: UserId,
    pub note_id: NoteId,
    #[serde(rename = "type")]
    pub kind: CardKind,
    pub prompt: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Card {
    /// Choices in presentation order; empty for non-mcq cards.
    #[must_use]
    pub fn choices(&self) -> &[String] {
        self.choices.as_deref().unwrap_or(&[])
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }

    /// Checks the choices/kind invariant.
    ///
    /// # Errors
    ///
    /// Returns `CardError::MissingChoices` for an mcq card without choices,
    /// `CardError::AnswerNotInChoices` when the canonical answer is not offered,
    /// and `CardError::UnexpectedChoices` for tf/cloze cards that carry choices.
    pub fn validate(&self) -> Result<(), CardError> {
        let choices = self.choices();
        match self.kind {
            CardKind::Mcq => {
                if choices.is_empty() {
                    return Err(CardError::MissingChoices(self.id));
                }
                if !choices.iter().any(|choice| *choice == self.answer) {
                    return Err(CardError::AnswerNotInChoices(self.id));
                }
            }
            CardKind::TrueFalse | CardKind::Cloze => {
                if !choices.is_empty() {
                    return Err(CardError::UnexpectedChoices {
                        id: self.id,
                        kind: self.kind,
                    });
                }
            }
        }
        Ok(())
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardError {
    #[error("multiple choice card {0} has no choices")]
    MissingChoices(CardId),

    #[error("answer of card {0} is not one of its choices")]
    AnswerNotInChoices(CardId),

    #[error("{} card {id} must not carry choices", kind.as_str())]
    UnexpectedChoices { id: CardId, kind: CardKind },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
