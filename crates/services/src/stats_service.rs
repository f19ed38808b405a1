use std::sync::Arc;

use gateway::{Page, QuizGateway, RequestContext, StatsGateway};
use quiz_core::model::{Quiz, TagStats, UserStats};

use crate::error::StatsServiceError;

/// Weak tags shown on the home screen.
pub const DEFAULT_WEAK_TAG_LIMIT: usize = 3;

/// Read-only access to backend statistics and quiz history.
///
/// Numbers are shown as delivered; nothing is recomputed here.
#[derive(Clone)]
pub struct StatsService {
    stats: Arc<dyn StatsGateway>,
    quizzes: Arc<dyn QuizGateway>,
}

impl StatsService {
    #[must_use]
    pub fn new(stats: Arc<dyn StatsGateway>, quizzes: Arc<dyn QuizGateway>) -> Self {
        Self { stats, quizzes }
    }

    /// Fetch the user's aggregate statistics.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError` if the gateway call fails.
    pub async fn overview(&self, ctx: &RequestContext) -> Result<UserStats, StatsServiceError> {
        let stats = self.stats.stats(ctx).await?;
        tracing::debug!(
            streak_days = stats.streak_days,
            due_today = stats.due_today,
            weak_tags = stats.weak_tags.len(),
            "stats loaded"
        );
        Ok(stats)
    }

    /// Completed quizzes, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError` if the gateway call fails.
    pub async fn recent_quizzes(
        &self,
        ctx: &RequestContext,
        page: Page,
    ) -> Result<Vec<Quiz>, StatsServiceError> {
        Ok(self.quizzes.history(ctx, page).await?)
    }

    /// The first `limit` weak tags, in delivered order (weakest first).
    #[must_use]
    pub fn top_weak_tags(stats: &UserStats, limit: usize) -> &[TagStats] {
        let end = limit.min(stats.weak_tags.len());
        &stats.weak_tags[..end]
    }
}
