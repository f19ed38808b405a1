//! Summary statistics for a graded quiz.
//!
//! Everything here is a pure function of the graded `Quiz`: no I/O and no
//! mutation. The score itself comes from the grading collaborator and is never
//! recomputed from the item counts.

mod band;
mod tags;

use thiserror::Error;

use crate::model::{CardId, CardKind, Quiz, QuizId};

pub use band::{
    CELEBRATORY_THRESHOLD, NEUTRAL_THRESHOLD, POSITIVE_THRESHOLD, RETRY_THRESHOLD, ScoreBand,
    ScoreColor,
};
pub use tags::{TagRollup, WEAK_TAG_THRESHOLD};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ScoringError {
    #[error("cannot summarize a quiz with no items")]
    EmptyQuiz,

    #[error("graded score {0} is outside [0, 1]")]
    ScoreOutOfRange(f64),
}

/// Display-ready view of one graded item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    /// 1-based position in the quiz.
    pub position: usize,
    pub card_id: CardId,
    pub kind: CardKind,
    pub prompt: String,
    pub correct_answer: String,
    pub user_answer: Option<String>,
    pub is_correct: bool,
    pub time_sec: Option<u32>,
    /// Only present when the item was not graded correct.
    pub rationale: Option<String>,
}

/// Derived summary of a graded quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    quiz_id: QuizId,
    correct_count: usize,
    total_count: usize,
    score_percentage: f64,
    average_time_sec: f64,
    band: ScoreBand,
    items: Vec<ItemOutcome>,
    tags: Vec<TagRollup>,
}

impl QuizResult {
    /// Summarizes a graded quiz.
    ///
    /// Items without `time_sec` add nothing to the time sum but still count in
    /// the average's denominator. Items without `is_correct` count as incorrect.
    ///
    /// # Errors
    ///
    /// Returns `ScoringError::EmptyQuiz` if the quiz has no items, and
    /// `ScoringError::ScoreOutOfRange` if the grader's score is not a fraction
    /// in `[0, 1]`.
    pub fn from_graded(quiz: &Quiz) -> Result<Self, ScoringError> {
        if quiz.is_empty() {
            return Err(ScoringError::EmptyQuiz);
        }
        let score = quiz.score.unwrap_or(0.0);
        if !(0.0..=1.0).contains(&score) {
            return Err(ScoringError::ScoreOutOfRange(score));
        }

        let total_count = quiz.len();
        let correct_count = quiz
            .quiz_items
            .iter()
            .filter(|item| item.is_correct == Some(true))
            .count();

        let score_percentage = score * 100.0;

        let time_sum: u64 = quiz
            .quiz_items
            .iter()
            .filter_map(|item| item.time_sec)
            .map(u64::from)
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let average_time_sec = time_sum as f64 / total_count as f64;

        let items = quiz
            .quiz_items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let is_correct = item.is_correct == Some(true);
                ItemOutcome {
                    position: index + 1,
                    card_id: item.card_id,
                    kind: item.card.kind,
                    prompt: item.card.prompt.clone(),
                    correct_answer: item.card.answer.clone(),
                    user_answer: item.user_answer.clone(),
                    is_correct,
                    time_sec: item.time_sec,
                    rationale: if is_correct {
                        None
                    } else {
                        item.card.rationale.clone()
                    },
                }
            })
            .collect();

        Ok(Self {
            quiz_id: quiz.id,
            correct_count,
            total_count,
            score_percentage,
            average_time_sec,
            band: ScoreBand::from_percentage(score_percentage),
            items,
            tags: tags::rollup(&quiz.quiz_items),
        })
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    #[must_use]
    pub fn incorrect_count(&self) -> usize {
        self.total_count - self.correct_count
    }

    #[must_use]
    pub fn score_percentage(&self) -> f64 {
        self.score_percentage
    }

    #[must_use]
    pub fn average_time_sec(&self) -> f64 {
        self.average_time_sec
    }

    #[must_use]
    pub fn band(&self) -> ScoreBand {
        self.band
    }

    /// Whether a retry action should be offered. Never triggered automatically.
    #[must_use]
    pub fn retry_eligible(&self) -> bool {
        self.score_percentage < RETRY_THRESHOLD
    }

    #[must_use]
    pub fn items(&self) -> &[ItemOutcome] {
        &self.items
    }

    /// Every tag seen in this quiz, weakest first.
    #[must_use]
    pub fn tag_rollups(&self) -> &[TagRollup] {
        &self.tags
    }

    /// Tags whose accuracy in this quiz is below `WEAK_TAG_THRESHOLD`.
    pub fn weak_tags(&self) -> impl Iterator<Item = &TagRollup> {
        self.tags.iter().filter(|rollup| rollup.is_weak())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
