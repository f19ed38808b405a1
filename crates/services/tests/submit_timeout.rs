use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gateway::{GatewayError, InMemoryGateway, Page, QuizGateway, RequestContext};
use quiz_core::Clock;
use quiz_core::model::{
    Card, CardId, CardKind, DailyQuiz, NoteId, Quiz, QuizId, QuizItem, QuizItemId,
    QuizSubmission, UserId,
};
use quiz_core::time::{fixed_now, manual_timer};
use services::{
    QuizSessionLoop, QuizSource, SessionConfig, SessionError, SessionPhase, SubmitFailure,
};

/// Delegates to an in-memory backend but stalls grading.
struct SlowGrader {
    inner: InMemoryGateway,
    delay: Duration,
}

#[async_trait]
impl QuizGateway for SlowGrader {
    async fn daily_quiz(&self, ctx: &RequestContext) -> Result<DailyQuiz, GatewayError> {
        self.inner.daily_quiz(ctx).await
    }

    async fn quiz(&self, ctx: &RequestContext, id: QuizId) -> Result<Quiz, GatewayError> {
        self.inner.quiz(ctx, id).await
    }

    async fn submit(
        &self,
        ctx: &RequestContext,
        submission: &QuizSubmission,
    ) -> Result<Quiz, GatewayError> {
        tokio::time::sleep(self.delay).await;
        self.inner.submit(ctx, submission).await
    }

    async fn history(&self, ctx: &RequestContext, page: Page) -> Result<Vec<Quiz>, GatewayError> {
        self.inner.history(ctx, page).await
    }
}

/// Grades correctly but reports another quiz's id.
struct WrongQuizGrader {
    inner: InMemoryGateway,
}

#[async_trait]
impl QuizGateway for WrongQuizGrader {
    async fn daily_quiz(&self, ctx: &RequestContext) -> Result<DailyQuiz, GatewayError> {
        self.inner.daily_quiz(ctx).await
    }

    async fn quiz(&self, ctx: &RequestContext, id: QuizId) -> Result<Quiz, GatewayError> {
        self.inner.quiz(ctx, id).await
    }

    async fn submit(
        &self,
        ctx: &RequestContext,
        submission: &QuizSubmission,
    ) -> Result<Quiz, GatewayError> {
        let mut graded = self.inner.submit(ctx, submission).await?;
        graded.id = QuizId::new(graded.id.value() + 1);
        Ok(graded)
    }

    async fn history(&self, ctx: &RequestContext, page: Page) -> Result<Vec<Quiz>, GatewayError> {
        self.inner.history(ctx, page).await
    }
}

fn cloze_quiz() -> Quiz {
    let card = Card {
        id: CardId::new(1),
        user_id: UserId::new(1),
        note_id: NoteId::new(1),
        kind: CardKind::Cloze,
        prompt: "The capital of France is ___".into(),
        answer: "Paris".into(),
        choices: None,
        tags: None,
        rationale: None,
        created_at: fixed_now(),
    };
    Quiz {
        id: QuizId::new(5),
        user_id: UserId::new(1),
        title: None,
        completed: false,
        score: None,
        created_at: fixed_now(),
        completed_at: None,
        quiz_items: vec![QuizItem::new(QuizItemId::new(50), card)],
    }
}

fn backend() -> InMemoryGateway {
    let gateway = InMemoryGateway::new(Clock::fixed(fixed_now()));
    gateway.insert_quiz(cloze_quiz()).unwrap();
    gateway
}

#[tokio::test(start_paused = true)]
async fn slow_grading_times_out_and_returns_to_last_item() {
    let slow = SlowGrader {
        inner: backend(),
        delay: Duration::from_secs(60),
    };
    let session = QuizSessionLoop::new(Arc::new(slow), Arc::new(manual_timer()))
        .with_config(SessionConfig::default().with_submit_timeout(Duration::from_secs(15)));
    let ctx = RequestContext::with_bearer("token");

    let mut controller = session
        .start(&ctx, QuizSource::ById(QuizId::new(5)))
        .await
        .unwrap()
        .controller;
    controller.answer("Paris").unwrap();

    let err = session.submit(&ctx, &mut controller).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::SubmitFailure(SubmitFailure::Timeout(limit)) if limit == Duration::from_secs(15)
    ));
    assert_eq!(controller.phase(), SessionPhase::InProgress { index: 0 });
    assert_eq!(controller.answer_for(CardId::new(1)), Some("Paris"));
}

#[tokio::test]
async fn graded_quiz_with_wrong_id_is_a_failed_submit() {
    let grader = WrongQuizGrader { inner: backend() };
    let session = QuizSessionLoop::new(Arc::new(grader), Arc::new(manual_timer()));
    let ctx = RequestContext::anonymous();

    let mut controller = session
        .start(&ctx, QuizSource::ById(QuizId::new(5)))
        .await
        .unwrap()
        .controller;
    controller.answer("paris").unwrap();

    let err = session.submit(&ctx, &mut controller).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::SubmitFailure(SubmitFailure::QuizMismatch { .. })
    ));
    assert_eq!(controller.phase(), SessionPhase::InProgress { index: 0 });
    assert!(controller.graded().is_none());
}
