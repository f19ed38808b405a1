//! Shared error types for the services crate.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use gateway::GatewayError;
use quiz_core::ScoringError;
use quiz_core::model::{QuizError, QuizId};

use crate::sessions::SessionPhase;

/// Controller operation named in an `InvalidTransition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Answer,
    Next,
    Previous,
    Skip,
    Submit,
    Key,
    Complete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Load => "load",
            Operation::Answer => "answer",
            Operation::Next => "next",
            Operation::Previous => "previous",
            Operation::Skip => "skip",
            Operation::Submit => "submit",
            Operation::Key => "key",
            Operation::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Why a quiz could not be loaded. Terminal for the session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadFailure {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("quiz has no items")]
    Empty,
    #[error(transparent)]
    Invalid(#[from] QuizError),
}

/// Why grading did not complete. Recoverable: answers are kept for a retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmitFailure {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("grading timed out after {0:?}")]
    Timeout(Duration),
    #[error("grader returned quiz {returned} for submission of quiz {expected}")]
    QuizMismatch { expected: QuizId, returned: QuizId },
}

/// Errors emitted by quiz session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("could not load quiz: {0}")]
    LoadFailure(#[from] LoadFailure),
    #[error("could not submit quiz: {0}")]
    SubmitFailure(#[from] SubmitFailure),
    /// Rejected without touching session state.
    #[error("{operation} is not allowed while {phase}")]
    InvalidTransition {
        operation: Operation,
        phase: SessionPhase,
    },
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

impl SessionError {
    /// True for rejected operations that left the session untouched.
    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, SessionError::InvalidTransition { .. })
    }
}

/// Errors emitted by `StatsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsServiceError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
