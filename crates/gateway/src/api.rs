use std::fmt;

use async_trait::async_trait;
use quiz_core::model::{DailyQuiz, Quiz, QuizId, QuizSubmission, UserStats};
use thiserror::Error;

/// Errors surfaced by gateway adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("not authenticated")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("{0} is not supported by this backend")]
    Unsupported(&'static str),
}

/// Credentials for a single backend call.
///
/// Passed explicitly by the caller on every request; adapters never look
/// credentials up on their own.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    bearer: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bearer(token: impl Into<String>) -> Self {
        Self {
            bearer: Some(token.into()),
        }
    }

    /// Builds a context from an optional token, ignoring blank values.
    #[must_use]
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(str::trim) {
            Some(token) if !token.is_empty() => Self::with_bearer(token),
            _ => Self::anonymous(),
        }
    }

    #[must_use]
    pub fn bearer(&self) -> Option<&str> {
        self.bearer.as_deref()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Offset pagination as used by the history endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, limit: 20 }
    }
}

/// Quiz fetch and grading contract of the backend.
#[async_trait]
pub trait QuizGateway: Send + Sync {
    /// Fetch today's scheduler-selected quiz.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` when no cards are due, or other gateway errors.
    async fn daily_quiz(&self, ctx: &RequestContext) -> Result<DailyQuiz, GatewayError>;

    /// Fetch an ungraded quiz by id.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` if missing, `GatewayError::Unsupported`
    /// for backends without a by-id route, or other gateway errors.
    async fn quiz(&self, ctx: &RequestContext, id: QuizId) -> Result<Quiz, GatewayError>;

    /// Grade a submission and return the completed quiz.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Conflict` if the quiz was already completed, or
    /// other gateway errors.
    async fn submit(
        &self,
        ctx: &RequestContext,
        submission: &QuizSubmission,
    ) -> Result<Quiz, GatewayError>;

    /// Completed quizzes, most recent first, without their items.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the history cannot be fetched.
    async fn history(&self, ctx: &RequestContext, page: Page) -> Result<Vec<Quiz>, GatewayError>;
}

/// Aggregate statistics contract of the backend.
#[async_trait]
pub trait StatsGateway: Send + Sync {
    /// # Errors
    ///
    /// Returns `GatewayError` if the statistics cannot be fetched.
    async fn stats(&self, ctx: &RequestContext) -> Result<UserStats, GatewayError>;
}
