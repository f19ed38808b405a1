use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quiz_core::Clock;
use quiz_core::model::{DailyQuiz, Quiz, QuizId, QuizSubmission, UserStats};

use crate::api::{GatewayError, Page, QuizGateway, RequestContext, StatsGateway};
use crate::grading::evaluate_answer;

#[derive(Debug, Clone, Copy)]
struct DailyPointer {
    quiz_id: QuizId,
    remaining_count: u32,
    streak_days: u32,
}

#[derive(Default)]
struct State {
    quizzes: HashMap<QuizId, Quiz>,
    daily: Option<DailyPointer>,
    stats: Option<UserStats>,
    failing_submits: u32,
    submissions: Vec<QuizSubmission>,
}

/// Simple in-memory backend for tests, demos and prototyping.
///
/// Grades with the reference policy in [`crate::grading`]. Items the
/// submission leaves out come back with `is_correct = false`.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    clock: Clock,
    state: Arc<Mutex<State>>,
}

impl InMemoryGateway {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, GatewayError> {
        self.state
            .lock()
            .map_err(|e| GatewayError::Connection(e.to_string()))
    }

    /// Store or replace a quiz.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Connection` if the state lock is poisoned.
    pub fn insert_quiz(&self, quiz: Quiz) -> Result<(), GatewayError> {
        self.lock()?.quizzes.insert(quiz.id, quiz);
        Ok(())
    }

    /// Serve `quiz_id` from the daily-quiz endpoint.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` if the quiz was never inserted.
    pub fn set_daily(
        &self,
        quiz_id: QuizId,
        remaining_count: u32,
        streak_days: u32,
    ) -> Result<(), GatewayError> {
        let mut guard = self.lock()?;
        if !guard.quizzes.contains_key(&quiz_id) {
            return Err(GatewayError::NotFound);
        }
        guard.daily = Some(DailyPointer {
            quiz_id,
            remaining_count,
            streak_days,
        });
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `GatewayError::Connection` if the state lock is poisoned.
    pub fn set_stats(&self, stats: UserStats) -> Result<(), GatewayError> {
        self.lock()?.stats = Some(stats);
        Ok(())
    }

    /// Make the next `count` grading calls fail with a connection error.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Connection` if the state lock is poisoned.
    pub fn fail_next_submits(&self, count: u32) -> Result<(), GatewayError> {
        self.lock()?.failing_submits = count;
        Ok(())
    }

    /// Submissions that reached grading, in arrival order.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Connection` if the state lock is poisoned.
    pub fn submissions(&self) -> Result<Vec<QuizSubmission>, GatewayError> {
        Ok(self.lock()?.submissions.clone())
    }
}

#[async_trait]
impl QuizGateway for InMemoryGateway {
    async fn daily_quiz(&self, _ctx: &RequestContext) -> Result<DailyQuiz, GatewayError> {
        let guard = self.lock()?;
        let pointer = guard.daily.ok_or(GatewayError::NotFound)?;
        let quiz = guard
            .quizzes
            .get(&pointer.quiz_id)
            .cloned()
            .ok_or(GatewayError::NotFound)?;
        Ok(DailyQuiz {
            quiz,
            remaining_count: pointer.remaining_count,
            streak_days: pointer.streak_days,
        })
    }

    async fn quiz(&self, _ctx: &RequestContext, id: QuizId) -> Result<Quiz, GatewayError> {
        let guard = self.lock()?;
        guard.quizzes.get(&id).cloned().ok_or(GatewayError::NotFound)
    }

    async fn submit(
        &self,
        _ctx: &RequestContext,
        submission: &QuizSubmission,
    ) -> Result<Quiz, GatewayError> {
        let now = self.clock.now();
        let mut guard = self.lock()?;

        if guard.failing_submits > 0 {
            guard.failing_submits -= 1;
            return Err(GatewayError::Connection("grading unavailable".into()));
        }

        let quiz = guard
            .quizzes
            .get_mut(&submission.quiz_id)
            .ok_or(GatewayError::NotFound)?;
        if quiz.completed {
            return Err(GatewayError::Conflict("quiz already completed".into()));
        }

        let mut correct = 0_u32;
        for item in &mut quiz.quiz_items {
            match submission.answer_for(item.card_id) {
                Some(answer) => {
                    let is_correct = evaluate_answer(&item.card, &answer.user_answer);
                    if is_correct {
                        correct += 1;
                    }
                    item.user_answer = Some(answer.user_answer.clone());
                    item.is_correct = Some(is_correct);
                    item.time_sec = Some(answer.time_sec);
                }
                None => item.is_correct = Some(false),
            }
        }

        // Score is over submitted answers, not over all items.
        let answered = submission.answers.len();
        quiz.score = Some(if answered == 0 {
            0.0
        } else {
            f64::from(correct) / answered as f64
        });
        quiz.completed = true;
        quiz.completed_at = Some(now);

        let graded = quiz.clone();
        guard.submissions.push(submission.clone());
        tracing::debug!(quiz_id = %graded.id, correct, answered, "graded submission");
        Ok(graded)
    }

    async fn history(&self, _ctx: &RequestContext, page: Page) -> Result<Vec<Quiz>, GatewayError> {
        let guard = self.lock()?;
        let mut completed: Vec<Quiz> = guard
            .quizzes
            .values()
            .filter(|quiz| quiz.completed)
            .cloned()
            .collect();
        completed.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

        Ok(completed
            .into_iter()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .map(|mut quiz| {
                quiz.quiz_items.clear();
                quiz
            })
            .collect())
    }
}

#[async_trait]
impl StatsGateway for InMemoryGateway {
    async fn stats(&self, _ctx: &RequestContext) -> Result<UserStats, GatewayError> {
        self.lock()?.stats.clone().ok_or(GatewayError::NotFound)
    }
}
