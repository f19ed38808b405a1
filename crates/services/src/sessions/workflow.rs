use std::sync::Arc;

use gateway::{QuizGateway, RequestContext};
use quiz_core::Timer;
use quiz_core::model::{DailyQuiz, Quiz, QuizId, QuizSubmission};

use super::controller::{AnswerRecorded, KeyOutcome, Navigation, QuizController};
use super::shortcuts::KeyInput;
use crate::config::SessionConfig;
use crate::error::{LoadFailure, Operation, SessionError, SubmitFailure};

/// Which quiz a session should load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizSource {
    Daily,
    ById(QuizId),
}

/// Streak context delivered alongside the daily quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyStatus {
    pub remaining_count: u32,
    pub streak_days: u32,
}

/// A controller that finished loading, plus daily context when relevant.
#[derive(Debug)]
pub struct StartedSession {
    pub controller: QuizController,
    pub daily: Option<DailyStatus>,
}

/// One user action routed through `dispatch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    Answer(String),
    Next,
    Previous,
    Skip,
    Submit,
    Key(KeyInput),
}

/// What `dispatch` did.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Answered(AnswerRecorded),
    Moved { from: usize, to: usize },
    Ignored,
    /// The action submitted the quiz and grading succeeded.
    Completed(Quiz),
}

/// Orchestrates quiz fetch and grading around a `QuizController`.
///
/// The controller stays synchronous and I/O free; this loop performs the
/// gateway calls and feeds their outcomes back as transitions.
#[derive(Clone)]
pub struct QuizSessionLoop {
    quizzes: Arc<dyn QuizGateway>,
    timer: Arc<dyn Timer>,
    config: SessionConfig,
}

impl QuizSessionLoop {
    #[must_use]
    pub fn new(quizzes: Arc<dyn QuizGateway>, timer: Arc<dyn Timer>) -> Self {
        Self {
            quizzes,
            timer,
            config: SessionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Fetch a quiz and hand back a controller positioned on its first item.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::LoadFailure` if the fetch fails or the quiz is
    /// empty or malformed.
    pub async fn start(
        &self,
        ctx: &RequestContext,
        source: QuizSource,
    ) -> Result<StartedSession, SessionError> {
        let mut controller = QuizController::new(Arc::clone(&self.timer));

        let fetched = match source {
            QuizSource::Daily => self.quizzes.daily_quiz(ctx).await.map(
                |DailyQuiz {
                     quiz,
                     remaining_count,
                     streak_days,
                 }| {
                    let status = DailyStatus {
                        remaining_count,
                        streak_days,
                    };
                    (quiz, Some(status))
                },
            ),
            QuizSource::ById(id) => self.quizzes.quiz(ctx, id).await.map(|quiz| (quiz, None)),
        };

        let (quiz, daily) = match fetched {
            Ok(found) => found,
            Err(err) => {
                let failure = LoadFailure::from(err);
                controller.load_failed(&failure)?;
                return Err(failure.into());
            }
        };

        controller.load_succeeded(quiz)?;
        tracing::info!(
            ?source,
            quiz_id = ?controller.quiz_id(),
            items = controller.len(),
            "quiz session started"
        );
        Ok(StartedSession { controller, daily })
    }

    /// Package the controller's answers and send them for grading.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless in progress, and
    /// `SessionError::SubmitFailure` if grading fails or times out.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        controller: &mut QuizController,
    ) -> Result<Quiz, SessionError> {
        let submission = controller.submit()?;
        self.finish(ctx, controller, submission).await
    }

    /// Send an already prepared submission and apply the grading outcome.
    ///
    /// The controller must be `Submitting` with `submission` prepared for its
    /// quiz; otherwise nothing is sent. On failure it returns to its last item
    /// with answers intact; nothing is retried automatically.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the controller is
    /// submitting that quiz, and `SessionError::SubmitFailure` if grading
    /// fails, times out or returns a different quiz.
    pub async fn finish(
        &self,
        ctx: &RequestContext,
        controller: &mut QuizController,
        submission: QuizSubmission,
    ) -> Result<Quiz, SessionError> {
        controller.require_submitting(Operation::Submit)?;
        if controller.quiz_id() != Some(submission.quiz_id) {
            tracing::debug!(
                quiz_id = ?controller.quiz_id(),
                submitted = %submission.quiz_id,
                "submission belongs to another quiz"
            );
            return Err(SessionError::InvalidTransition {
                operation: Operation::Submit,
                phase: controller.phase(),
            });
        }

        let timeout = self.config.submit_timeout;
        let outcome = tokio::time::timeout(timeout, self.quizzes.submit(ctx, &submission)).await;

        let graded = match outcome {
            Ok(Ok(graded)) => graded,
            Ok(Err(err)) => return Err(Self::fail(controller, SubmitFailure::from(err))),
            Err(_elapsed) => return Err(Self::fail(controller, SubmitFailure::Timeout(timeout))),
        };

        let graded = controller.submit_succeeded(graded)?.clone();
        tracing::info!(
            quiz_id = %graded.id,
            answers = submission.answers.len(),
            score = ?graded.score,
            "quiz graded"
        );
        Ok(graded)
    }

    /// Apply one user action, sending the submission if the action produced one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` for actions the current phase
    /// rejects, and `SessionError::SubmitFailure` if grading fails.
    pub async fn dispatch(
        &self,
        ctx: &RequestContext,
        controller: &mut QuizController,
        action: SessionAction,
    ) -> Result<StepOutcome, SessionError> {
        let navigation = match action {
            SessionAction::Answer(value) => {
                return controller.answer(value).map(StepOutcome::Answered);
            }
            SessionAction::Next => controller.next()?,
            SessionAction::Previous => controller.previous()?,
            SessionAction::Skip => controller.skip()?,
            SessionAction::Submit => Navigation::Submit(controller.submit()?),
            SessionAction::Key(key) => match controller.handle_key(key)? {
                KeyOutcome::Answered(recorded) => return Ok(StepOutcome::Answered(recorded)),
                KeyOutcome::Ignored => return Ok(StepOutcome::Ignored),
                KeyOutcome::Navigated(navigation) => navigation,
            },
        };

        match navigation {
            Navigation::Moved { from, to } => Ok(StepOutcome::Moved { from, to }),
            Navigation::Submit(submission) => self
                .finish(ctx, controller, submission)
                .await
                .map(StepOutcome::Completed),
        }
    }

    fn fail(controller: &mut QuizController, failure: SubmitFailure) -> SessionError {
        if let Err(err) = controller.submit_failed(&failure) {
            return err;
        }
        failure.into()
    }
}

impl std::fmt::Debug for QuizSessionLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizSessionLoop")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
