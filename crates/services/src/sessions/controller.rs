use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::Timer;
use quiz_core::model::{CardId, Quiz, QuizId, QuizItem, QuizSubmission, SubmittedAnswer};

use super::progress::SessionProgress;
use super::shortcuts::{self, KeyInput, Shortcut};
use crate::error::{LoadFailure, Operation, SessionError, SubmitFailure};

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Where a quiz attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    InProgress { index: usize },
    Submitting,
    Completed,
    /// The quiz could not be loaded. Terminal.
    Failed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Loading => f.write_str("loading"),
            SessionPhase::InProgress { index } => write!(f, "in progress at item {index}"),
            SessionPhase::Submitting => f.write_str("submitting"),
            SessionPhase::Completed => f.write_str("completed"),
            SessionPhase::Failed => f.write_str("failed"),
        }
    }
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// A captured answer and the time charged to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerRecorded {
    pub card_id: CardId,
    pub time_sec: u32,
}

/// Result of `next`, `skip` or `previous`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Moved { from: usize, to: usize },
    /// Navigation ran past the last item; the session is now submitting and
    /// the caller must deliver this payload to the grader.
    Submit(QuizSubmission),
}

/// Result of `handle_key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Answered(AnswerRecorded),
    Navigated(Navigation),
    Ignored,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Drives exactly one quiz attempt from the first item to submission.
///
/// Owns all interaction state: position, captured answers and the seconds
/// charged to each card. Never performs I/O; the submission payload is handed
/// back to the caller, who reports the grading outcome through
/// `submit_succeeded` or `submit_failed`.
///
/// Not safe for concurrent mutation. Share behind an external lock if needed.
pub struct QuizController {
    timer: Arc<dyn Timer>,
    phase: SessionPhase,
    quiz: Option<Quiz>,
    answers: HashMap<CardId, String>,
    elapsed: HashMap<CardId, u32>,
    segment_start: DateTime<Utc>,
    graded: Option<Quiz>,
    failure: Option<String>,
}

impl QuizController {
    /// Creates a controller waiting for its quiz.
    #[must_use]
    pub fn new(timer: Arc<dyn Timer>) -> Self {
        let segment_start = timer.now();
        Self {
            timer,
            phase: SessionPhase::Loading,
            quiz: None,
            answers: HashMap::new(),
            elapsed: HashMap::new(),
            segment_start,
            graded: None,
            failure: None,
        }
    }

    /// Creates a controller and immediately loads `quiz`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::LoadFailure` if the quiz is empty or malformed.
    pub fn start(timer: Arc<dyn Timer>, quiz: Quiz) -> Result<Self, SessionError> {
        let mut controller = Self::new(timer);
        controller.load_succeeded(quiz)?;
        Ok(controller)
    }

    //
    // ─── LOADING ───────────────────────────────────────────────────────────────
    //

    /// `Loading → InProgress(0)`; starts timing the first item.
    ///
    /// An empty or structurally invalid quiz moves the session to `Failed`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless loading, and
    /// `SessionError::LoadFailure` if the quiz is rejected.
    pub fn load_succeeded(&mut self, quiz: Quiz) -> Result<(), SessionError> {
        self.require_loading()?;

        let checked = if quiz.is_empty() {
            Err(LoadFailure::Empty)
        } else {
            quiz.validate().map_err(LoadFailure::Invalid)
        };
        if let Err(failure) = checked {
            self.load_failed(&failure)?;
            return Err(failure.into());
        }

        tracing::debug!(quiz_id = %quiz.id, items = quiz.len(), "quiz loaded");
        self.quiz = Some(quiz);
        self.phase = SessionPhase::InProgress { index: 0 };
        self.segment_start = self.timer.now();
        Ok(())
    }

    /// `Loading → Failed`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless loading.
    pub fn load_failed(&mut self, failure: &LoadFailure) -> Result<(), SessionError> {
        self.require_loading()?;
        tracing::warn!(error = %failure, "quiz failed to load");
        self.failure = Some(failure.to_string());
        self.phase = SessionPhase::Failed;
        Ok(())
    }

    //
    // ─── INTERACTION ───────────────────────────────────────────────────────────
    //

    /// Records `value` for the visible item and charges it the time since the
    /// last answer (or since the item sequence started).
    ///
    /// Re-answering replaces both the stored answer and its time. Any string is
    /// accepted, including the empty string.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless in progress.
    pub fn answer(&mut self, value: impl Into<String>) -> Result<AnswerRecorded, SessionError> {
        let index = self.require_in_progress(Operation::Answer)?;
        let card_id = self.card_id_at(index, Operation::Answer)?;

        let time_sec = self.close_segment();
        self.answers.insert(card_id, value.into());
        self.elapsed.insert(card_id, time_sec);

        tracing::debug!(%card_id, index, time_sec, "answer recorded");
        Ok(AnswerRecorded { card_id, time_sec })
    }

    /// Moves to the next item, or submits when already on the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless in progress.
    pub fn next(&mut self) -> Result<Navigation, SessionError> {
        self.advance(Operation::Next)
    }

    /// Same as `next`; never records an answer for the skipped item.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless in progress.
    pub fn skip(&mut self) -> Result<Navigation, SessionError> {
        self.advance(Operation::Skip)
    }

    /// Moves back one item without touching answers, times or the running
    /// segment.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` on the first item or when not
    /// in progress; the session is left unchanged.
    pub fn previous(&mut self) -> Result<Navigation, SessionError> {
        let index = self.require_in_progress(Operation::Previous)?;
        if index == 0 {
            return Err(self.rejected(Operation::Previous));
        }
        self.phase = SessionPhase::InProgress { index: index - 1 };
        Ok(Navigation::Moved {
            from: index,
            to: index - 1,
        })
    }

    /// `InProgress → Submitting`; packages every answered card.
    ///
    /// Unanswered items are omitted. A card answered without a recorded time
    /// is sent with 0 seconds. A second call while submitting is rejected, so
    /// at most one payload is ever in flight.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless in progress.
    pub fn submit(&mut self) -> Result<QuizSubmission, SessionError> {
        self.require_in_progress(Operation::Submit)?;
        let submission = self.build_submission(Operation::Submit)?;
        self.phase = SessionPhase::Submitting;
        tracing::debug!(
            quiz_id = %submission.quiz_id,
            answers = submission.answers.len(),
            "submission prepared"
        );
        Ok(submission)
    }

    /// Applies a keyboard shortcut to the visible item.
    ///
    /// `Enter` advances only when the visible item has a non-empty answer;
    /// otherwise the key is ignored. An empty answer can still be submitted
    /// through `next` or `submit`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless in progress.
    pub fn handle_key(&mut self, key: KeyInput) -> Result<KeyOutcome, SessionError> {
        let index = self.require_in_progress(Operation::Key)?;
        let item = self.item_at(index, Operation::Key)?;
        let card_id = item.card_id;

        match shortcuts::resolve(item.card.kind, item.card.choices(), key) {
            Shortcut::Answer(value) => self.answer(value).map(KeyOutcome::Answered),
            Shortcut::Advance if self.answer_for(card_id).is_some_and(|a| !a.is_empty()) => {
                self.next().map(KeyOutcome::Navigated)
            }
            Shortcut::Skip => self.skip().map(KeyOutcome::Navigated),
            Shortcut::Advance | Shortcut::Ignored => Ok(KeyOutcome::Ignored),
        }
    }

    //
    // ─── GRADING OUTCOME ───────────────────────────────────────────────────────
    //

    /// `Submitting → Completed`; discards transient answers and exposes the
    /// graded quiz.
    ///
    /// A graded quiz for a different quiz id is treated as a failed submit.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless submitting, and
    /// `SessionError::SubmitFailure` on a quiz id mismatch.
    pub fn submit_succeeded(&mut self, graded: Quiz) -> Result<&Quiz, SessionError> {
        self.require_submitting(Operation::Complete)?;
        let expected = self.quiz_id().ok_or_else(|| self.rejected(Operation::Complete))?;

        if graded.id != expected {
            let failure = SubmitFailure::QuizMismatch {
                expected,
                returned: graded.id,
            };
            self.submit_failed(&failure)?;
            return Err(failure.into());
        }

        tracing::debug!(quiz_id = %graded.id, score = ?graded.score, "quiz graded");
        self.answers.clear();
        self.elapsed.clear();
        self.phase = SessionPhase::Completed;
        Ok(&*self.graded.insert(graded))
    }

    /// `Submitting → InProgress(last)` with answers and times intact, so the
    /// user can submit again.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless submitting.
    pub fn submit_failed(&mut self, failure: &SubmitFailure) -> Result<(), SessionError> {
        self.require_submitting(Operation::Complete)?;
        let last = self.len().saturating_sub(1);
        tracing::warn!(error = %failure, "quiz submission failed");
        self.phase = SessionPhase::InProgress { index: last };
        // Waiting on the grader is not time spent on the item.
        self.segment_start = self.timer.now();
        Ok(())
    }

    //
    // ─── READ ACCESS ───────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    #[must_use]
    pub fn quiz_id(&self) -> Option<QuizId> {
        self.quiz.as_ref().map(|quiz| quiz.id)
    }

    /// Number of items in the loaded quiz (0 while loading).
    #[must_use]
    pub fn len(&self) -> usize {
        self.quiz.as_ref().map_or(0, Quiz::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            SessionPhase::InProgress { index } => Some(index),
            _ => None,
        }
    }

    #[must_use]
    pub fn current_item(&self) -> Option<&QuizItem> {
        let index = self.current_index()?;
        self.quiz.as_ref()?.item(index)
    }

    /// The captured answer for the visible item, for highlighting.
    #[must_use]
    pub fn current_answer(&self) -> Option<&str> {
        let card_id = self.current_item()?.card_id;
        self.answer_for(card_id)
    }

    #[must_use]
    pub fn answer_for(&self, card_id: CardId) -> Option<&str> {
        self.answers.get(&card_id).map(String::as_str)
    }

    #[must_use]
    pub fn elapsed_for(&self, card_id: CardId) -> Option<u32> {
        self.elapsed.get(&card_id).copied()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        let index = self.current_index()?;
        let total = self.len();
        Some(SessionProgress {
            position: index + 1,
            total,
            answered: self.answers.len(),
            is_last: index + 1 == total,
        })
    }

    /// The graded quiz once the session has completed.
    #[must_use]
    pub fn graded(&self) -> Option<&Quiz> {
        self.graded.as_ref()
    }

    /// Load failure description once the session has failed.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    fn advance(&mut self, operation: Operation) -> Result<Navigation, SessionError> {
        let index = self.require_in_progress(operation)?;
        if index + 1 < self.len() {
            self.phase = SessionPhase::InProgress { index: index + 1 };
            return Ok(Navigation::Moved {
                from: index,
                to: index + 1,
            });
        }
        self.submit().map(Navigation::Submit)
    }

    /// Seconds since `segment_start`, rounded; restarts the segment.
    fn close_segment(&mut self) -> u32 {
        let now = self.timer.now();
        let delta = now - self.segment_start;
        self.segment_start = now;

        let millis = delta.num_milliseconds();
        if millis < 0 {
            tracing::warn!(millis, "timer went backwards; charging 0 seconds");
            return 0;
        }
        u32::try_from((millis + 500) / 1000).unwrap_or(u32::MAX)
    }

    fn build_submission(&self, operation: Operation) -> Result<QuizSubmission, SessionError> {
        let quiz = self.quiz.as_ref().ok_or_else(|| self.rejected(operation))?;
        let answers = quiz
            .quiz_items
            .iter()
            .filter_map(|item| {
                let user_answer = self.answers.get(&item.card_id)?;
                Some(SubmittedAnswer {
                    card_id: item.card_id,
                    user_answer: user_answer.clone(),
                    time_sec: self.elapsed.get(&item.card_id).copied().unwrap_or(0),
                })
            })
            .collect();
        Ok(QuizSubmission {
            quiz_id: quiz.id,
            answers,
        })
    }

    fn item_at(&self, index: usize, operation: Operation) -> Result<&QuizItem, SessionError> {
        self.quiz
            .as_ref()
            .and_then(|quiz| quiz.item(index))
            .ok_or_else(|| self.rejected(operation))
    }

    fn card_id_at(&self, index: usize, operation: Operation) -> Result<CardId, SessionError> {
        self.item_at(index, operation).map(|item| item.card_id)
    }

    fn rejected(&self, operation: Operation) -> SessionError {
        tracing::debug!(%operation, phase = %self.phase, "operation rejected");
        SessionError::InvalidTransition {
            operation,
            phase: self.phase,
        }
    }

    fn require_in_progress(&self, operation: Operation) -> Result<usize, SessionError> {
        match self.phase {
            SessionPhase::InProgress { index } => Ok(index),
            _ => Err(self.rejected(operation)),
        }
    }

    fn require_loading(&self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Loading => Ok(()),
            _ => Err(self.rejected(Operation::Load)),
        }
    }

    pub(crate) fn require_submitting(&self, operation: Operation) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Submitting => Ok(()),
            _ => Err(self.rejected(operation)),
        }
    }
}

impl fmt::Debug for QuizController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizController")
            .field("phase", &self.phase)
            .field("quiz_id", &self.quiz_id())
            .field("items", &self.len())
            .field("answers_len", &self.answers.len())
            .field("segment_start", &self.segment_start)
            .field("graded", &self.graded.is_some())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::ManualTimer;
    use quiz_core::model::{Card, CardKind, NoteId, QuizItemId, UserId};
    use quiz_core::time::{fixed_now, manual_timer};

    fn card(id: u64, kind: CardKind) -> Card {
        let (answer, choices) = match kind {
            CardKind::Mcq => ("B", Some(vec!["A".into(), "B".into(), "C".into()])),
            CardKind::TrueFalse => ("true", None),
            CardKind::Cloze => ("Paris", None),
        };
        Card {
            id: CardId::new(id),
            user_id: UserId::new(1),
            note_id: NoteId::new(1),
            kind,
            prompt: format!("Q{id}"),
            answer: answer.into(),
            choices,
            tags: None,
            rationale: None,
            created_at: fixed_now(),
        }
    }

    fn quiz(kinds: &[CardKind]) -> Quiz {
        Quiz {
            id: QuizId::new(7),
            user_id: UserId::new(1),
            title: None,
            completed: false,
            score: None,
            created_at: fixed_now(),
            completed_at: None,
            quiz_items: kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| {
                    let id = i as u64 + 1;
                    QuizItem::new(QuizItemId::new(100 + id), card(id, *kind))
                })
                .collect(),
        }
    }

    fn started(kinds: &[CardKind]) -> (QuizController, ManualTimer) {
        let timer = manual_timer();
        let controller = QuizController::start(Arc::new(timer.clone()), quiz(kinds)).unwrap();
        (controller, timer)
    }

    fn cloze(n: usize) -> Vec<CardKind> {
        vec![CardKind::Cloze; n]
    }

    #[test]
    fn starts_loading_and_rejects_input() {
        let mut controller = QuizController::new(Arc::new(manual_timer()));
        assert_eq!(controller.phase(), SessionPhase::Loading);
        let err = controller.answer("x").unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                operation: Operation::Answer,
                phase: SessionPhase::Loading
            }
        ));
        assert!(controller.next().unwrap_err().is_invalid_transition());
        assert!(controller.submit().unwrap_err().is_invalid_transition());
    }

    #[test]
    fn empty_quiz_fails_to_load() {
        let mut controller = QuizController::new(Arc::new(manual_timer()));
        let err = controller.load_succeeded(quiz(&[])).unwrap_err();
        assert!(matches!(err, SessionError::LoadFailure(LoadFailure::Empty)));
        assert_eq!(controller.phase(), SessionPhase::Failed);
        assert!(controller.failure().is_some());
        assert!(controller.answer("x").unwrap_err().is_invalid_transition());
    }

    #[test]
    fn invalid_card_fails_to_load() {
        let mut bad = quiz(&[CardKind::Mcq]);
        bad.quiz_items[0].card.choices = None;
        let mut controller = QuizController::new(Arc::new(manual_timer()));
        let err = controller.load_succeeded(bad).unwrap_err();
        assert!(matches!(err, SessionError::LoadFailure(LoadFailure::Invalid(_))));
        assert_eq!(controller.phase(), SessionPhase::Failed);
    }

    #[test]
    fn forward_walk_takes_n_minus_one_moves_then_submits_once() {
        let (mut controller, _timer) = started(&cloze(4));
        for expected in 1..4 {
            let nav = controller.next().unwrap();
            assert_eq!(
                nav,
                Navigation::Moved {
                    from: expected - 1,
                    to: expected
                }
            );
        }
        assert_eq!(controller.current_index(), Some(3));

        let nav = controller.next().unwrap();
        assert!(matches!(nav, Navigation::Submit(_)));
        assert_eq!(controller.phase(), SessionPhase::Submitting);

        assert!(controller.next().unwrap_err().is_invalid_transition());
        assert!(controller.skip().unwrap_err().is_invalid_transition());
        assert!(controller.submit().unwrap_err().is_invalid_transition());
    }

    #[test]
    fn previous_calls_do_not_change_forward_count() {
        let (mut controller, _timer) = started(&cloze(3));
        controller.next().unwrap();
        controller.previous().unwrap();
        controller.next().unwrap();
        controller.next().unwrap();
        controller.previous().unwrap();
        controller.next().unwrap();
        assert_eq!(controller.current_index(), Some(2));
        assert!(matches!(controller.skip().unwrap(), Navigation::Submit(_)));
    }

    #[test]
    fn previous_at_first_item_is_a_rejected_no_op() {
        let (mut controller, timer) = started(&cloze(2));
        timer.advance_secs(3);
        controller.answer("Paris").unwrap();

        let err = controller.previous().unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                operation: Operation::Previous,
                phase: SessionPhase::InProgress { index: 0 }
            }
        ));
        assert_eq!(controller.current_index(), Some(0));
        assert_eq!(controller.answer_for(CardId::new(1)), Some("Paris"));
        assert_eq!(controller.elapsed_for(CardId::new(1)), Some(3));
    }

    #[test]
    fn answer_then_submit_includes_card() {
        let (mut controller, timer) = started(&cloze(3));
        timer.advance_secs(5);
        controller.answer("Paris").unwrap();
        let submission = controller.submit().unwrap();

        assert_eq!(submission.quiz_id, QuizId::new(7));
        assert_eq!(
            submission.answers,
            vec![SubmittedAnswer {
                card_id: CardId::new(1),
                user_answer: "Paris".into(),
                time_sec: 5,
            }]
        );
        assert!(!submission.contains(CardId::new(2)));
    }

    #[test]
    fn reanswer_replaces_value_and_time() {
        let (mut controller, timer) = started(&cloze(2));
        timer.advance_secs(4);
        controller.answer("Lyon").unwrap();
        timer.advance_secs(2);
        let recorded = controller.answer("Paris").unwrap();

        assert_eq!(recorded.time_sec, 2);
        assert_eq!(controller.answer_for(CardId::new(1)), Some("Paris"));
        let submission = controller.submit().unwrap();
        assert_eq!(submission.answers.len(), 1);
        assert_eq!(submission.answers[0].user_answer, "Paris");
        assert_eq!(submission.answers[0].time_sec, 2);
    }

    #[test]
    fn time_is_charged_between_answers_not_navigation() {
        let (mut controller, timer) = started(&cloze(3));
        timer.advance_secs(3);
        controller.answer("a").unwrap();
        timer.advance_secs(10);
        controller.next().unwrap();
        timer.advance_secs(4);
        controller.answer("b").unwrap();
        controller.previous().unwrap();
        timer.advance_secs(20);
        controller.next().unwrap();

        assert_eq!(controller.elapsed_for(CardId::new(1)), Some(3));
        assert_eq!(controller.elapsed_for(CardId::new(2)), Some(14));
    }

    #[test]
    fn immediate_first_answer_is_zero_seconds() {
        let (mut controller, _timer) = started(&cloze(1));
        let recorded = controller.answer("").unwrap();
        assert_eq!(recorded.time_sec, 0);
        let submission = controller.submit().unwrap();
        assert_eq!(submission.answers[0].user_answer, "");
        assert_eq!(submission.answers[0].time_sec, 0);
    }

    #[test]
    fn elapsed_rounds_to_nearest_second() {
        let (mut controller, timer) = started(&cloze(2));
        timer.advance(chrono::Duration::milliseconds(2_499));
        assert_eq!(controller.answer("a").unwrap().time_sec, 2);
        timer.advance(chrono::Duration::milliseconds(2_500));
        assert_eq!(controller.answer("a").unwrap().time_sec, 3);
    }

    #[test]
    fn backwards_clock_clamps_to_zero() {
        let (mut controller, timer) = started(&cloze(1));
        timer.advance_secs(-30);
        assert_eq!(controller.answer("a").unwrap().time_sec, 0);
        timer.advance_secs(2);
        assert_eq!(controller.answer("b").unwrap().time_sec, 2);
    }

    #[test]
    fn skip_never_records_an_answer() {
        let (mut controller, _timer) = started(&cloze(2));
        controller.skip().unwrap();
        let Navigation::Submit(submission) = controller.skip().unwrap() else {
            panic!("expected submission");
        };
        assert!(submission.answers.is_empty());
        assert_eq!(controller.answered_count(), 0);
    }

    #[test]
    fn submission_follows_quiz_order() {
        let (mut controller, _timer) = started(&cloze(3));
        controller.next().unwrap();
        controller.next().unwrap();
        controller.answer("c").unwrap();
        controller.previous().unwrap();
        controller.previous().unwrap();
        controller.answer("a").unwrap();
        let submission = controller.submit().unwrap();
        let ids: Vec<_> = submission.answers.iter().map(|a| a.card_id).collect();
        assert_eq!(ids, [CardId::new(1), CardId::new(3)]);
    }

    #[test]
    fn submit_failure_returns_to_last_item_with_state() {
        let (mut controller, timer) = started(&cloze(3));
        timer.advance_secs(6);
        controller.answer("a").unwrap();
        controller.submit().unwrap();

        controller
            .submit_failed(&SubmitFailure::Timeout(std::time::Duration::from_secs(15)))
            .unwrap();
        assert_eq!(controller.phase(), SessionPhase::InProgress { index: 2 });
        assert_eq!(controller.answer_for(CardId::new(1)), Some("a"));
        assert_eq!(controller.elapsed_for(CardId::new(1)), Some(6));

        let retry = controller.submit().unwrap();
        assert_eq!(retry.answers.len(), 1);
        assert_eq!(retry.answers[0].time_sec, 6);
    }

    #[test]
    fn submit_success_completes_and_discards_transient_state() {
        let (mut controller, _timer) = started(&cloze(1));
        controller.answer("Paris").unwrap();
        controller.submit().unwrap();

        let mut graded = quiz(&cloze(1));
        graded.completed = true;
        graded.score = Some(1.0);
        graded.quiz_items[0].is_correct = Some(true);

        let exposed = controller.submit_succeeded(graded).unwrap();
        assert_eq!(exposed.score, Some(1.0));
        assert!(controller.is_complete());
        assert_eq!(controller.answered_count(), 0);
        assert!(controller.graded().is_some());
        assert!(controller.answer("again").unwrap_err().is_invalid_transition());
    }

    #[test]
    fn graded_quiz_for_another_id_is_a_submit_failure() {
        let (mut controller, _timer) = started(&cloze(2));
        controller.answer("a").unwrap();
        controller.submit().unwrap();

        let mut other = quiz(&cloze(2));
        other.id = QuizId::new(99);
        let err = controller.submit_succeeded(other).unwrap_err();
        assert!(matches!(
            err,
            SessionError::SubmitFailure(SubmitFailure::QuizMismatch { .. })
        ));
        assert_eq!(controller.phase(), SessionPhase::InProgress { index: 1 });
        assert_eq!(controller.answered_count(), 1);
    }

    #[test]
    fn grading_outcome_requires_submitting() {
        let (mut controller, _timer) = started(&cloze(1));
        let err = controller
            .submit_failed(&SubmitFailure::Timeout(std::time::Duration::from_secs(1)))
            .unwrap_err();
        assert!(err.is_invalid_transition());
        assert_eq!(controller.phase(), SessionPhase::InProgress { index: 0 });
    }

    #[test]
    fn keys_answer_and_navigate() {
        let (mut controller, _timer) = started(&[CardKind::Mcq, CardKind::TrueFalse]);

        assert_eq!(controller.handle_key(KeyInput::Enter).unwrap(), KeyOutcome::Ignored);
        assert_eq!(controller.current_index(), Some(0));

        assert_eq!(controller.handle_key(KeyInput::Char('9')).unwrap(), KeyOutcome::Ignored);
        let outcome = controller.handle_key(KeyInput::Char('2')).unwrap();
        assert!(matches!(outcome, KeyOutcome::Answered(_)));
        assert_eq!(controller.current_answer(), Some("B"));

        let outcome = controller.handle_key(KeyInput::Enter).unwrap();
        assert_eq!(
            outcome,
            KeyOutcome::Navigated(Navigation::Moved { from: 0, to: 1 })
        );

        controller.handle_key(KeyInput::Char('F')).unwrap();
        assert_eq!(controller.current_answer(), Some("false"));

        let outcome = controller.handle_key(KeyInput::Escape).unwrap();
        let KeyOutcome::Navigated(Navigation::Submit(submission)) = outcome else {
            panic!("expected submission");
        };
        assert_eq!(submission.answers.len(), 2);
    }

    #[test]
    fn enter_ignores_empty_answer() {
        let (mut controller, _timer) = started(&cloze(2));
        controller.answer("").unwrap();
        assert_eq!(controller.handle_key(KeyInput::Enter).unwrap(), KeyOutcome::Ignored);
        assert_eq!(controller.current_index(), Some(0));

        controller.answer("Paris").unwrap();
        assert_eq!(
            controller.handle_key(KeyInput::Enter).unwrap(),
            KeyOutcome::Navigated(Navigation::Moved { from: 0, to: 1 })
        );
    }

    #[test]
    fn escape_skips_unanswered_items() {
        let (mut controller, _timer) = started(&cloze(2));
        let outcome = controller.handle_key(KeyInput::Escape).unwrap();
        assert_eq!(
            outcome,
            KeyOutcome::Navigated(Navigation::Moved { from: 0, to: 1 })
        );
        assert_eq!(controller.answered_count(), 0);
    }

    #[test]
    fn progress_reports_position() {
        let (mut controller, _timer) = started(&cloze(4));
        controller.answer("a").unwrap();
        controller.next().unwrap();
        let progress = controller.progress().unwrap();
        assert_eq!(progress.position, 2);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.answered, 1);
        assert!(!progress.is_last);
        assert!((progress.percent() - 50.0).abs() < f64::EPSILON);
    }
}
