use async_trait::async_trait;
use quiz_core::model::{DailyQuiz, Quiz, QuizId, QuizSubmission, UserStats};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::config::ApiConfig;
use crate::api::{GatewayError, Page, QuizGateway, RequestContext, StatsGateway};

/// `QuizGateway` and `StatsGateway` over the backend's REST API.
///
/// The REST backend only serves the daily quiz, grading, history and stats.
/// Fetching a quiz by id is answered with `GatewayError::Unsupported`.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    config: ApiConfig,
}

impl HttpGateway {
    /// # Errors
    ///
    /// Returns `GatewayError::Http` if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn get(&self, ctx: &RequestContext, path: &str) -> RequestBuilder {
        authorize(self.client.get(self.config.endpoint(path)), ctx)
    }

    fn post(&self, ctx: &RequestContext, path: &str) -> RequestBuilder {
        authorize(self.client.post(self.config.endpoint(path)), ctx)
    }
}

fn authorize(request: RequestBuilder, ctx: &RequestContext) -> RequestBuilder {
    match ctx.bearer() {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

const ALREADY_COMPLETED: &str = "already completed";

/// Error payload of the backend: `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Maps a non-success status onto the gateway error taxonomy.
///
/// The backend rejects a resubmission with 400 and an "already completed"
/// detail; that case is a conflict like a plain 409.
fn status_error(status: StatusCode, detail: Option<&str>) -> GatewayError {
    match status {
        StatusCode::UNAUTHORIZED => GatewayError::Unauthorized,
        StatusCode::NOT_FOUND => GatewayError::NotFound,
        StatusCode::CONFLICT => {
            GatewayError::Conflict(detail.unwrap_or("conflict").to_string())
        }
        StatusCode::BAD_REQUEST => match detail {
            Some(detail) if detail.to_lowercase().contains(ALREADY_COMPLETED) => {
                GatewayError::Conflict(detail.to_string())
            }
            _ => GatewayError::HttpStatus(status),
        },
        other => GatewayError::HttpStatus(other),
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let url = response.url().to_string();
        // Non-string details (validation errors) are not needed for mapping.
        let detail = response.json::<ErrorBody>().await.ok().map(|body| body.detail);
        tracing::warn!(%status, %url, detail = ?detail, "backend request failed");
        return Err(status_error(status, detail.as_deref()));
    }
    Ok(response.json().await?)
}

#[async_trait]
impl QuizGateway for HttpGateway {
    async fn daily_quiz(&self, ctx: &RequestContext) -> Result<DailyQuiz, GatewayError> {
        tracing::debug!("fetching daily quiz");
        let response = self.get(ctx, "daily-quiz").send().await?;
        read_json(response).await
    }

    async fn quiz(&self, _ctx: &RequestContext, id: QuizId) -> Result<Quiz, GatewayError> {
        tracing::debug!(quiz_id = %id, "by-id quiz lookup requested from REST backend");
        Err(GatewayError::Unsupported("fetching a quiz by id"))
    }

    async fn submit(
        &self,
        ctx: &RequestContext,
        submission: &QuizSubmission,
    ) -> Result<Quiz, GatewayError> {
        tracing::debug!(
            quiz_id = %submission.quiz_id,
            answers = submission.answers.len(),
            "submitting quiz"
        );
        let response = self
            .post(ctx, "submit-quiz")
            .json(submission)
            .send()
            .await?;
        read_json(response).await
    }

    async fn history(&self, ctx: &RequestContext, page: Page) -> Result<Vec<Quiz>, GatewayError> {
        let response = self
            .get(ctx, "quiz-history")
            .query(&[("skip", page.skip), ("limit", page.limit)])
            .send()
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl StatsGateway for HttpGateway {
    async fn stats(&self, ctx: &RequestContext) -> Result<UserStats, GatewayError> {
        let response = self.get(ctx, "stats").send().await?;
        read_json(response).await
    }
}
