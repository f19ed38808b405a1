mod controller;
mod progress;
pub mod shortcuts;
mod workflow;

// Public API of the quiz session subsystem.
pub use crate::error::{LoadFailure, Operation, SessionError, SubmitFailure};
pub use controller::{AnswerRecorded, KeyOutcome, Navigation, QuizController, SessionPhase};
pub use progress::SessionProgress;
pub use shortcuts::{KeyInput, Shortcut};
pub use workflow::{
    DailyStatus, QuizSessionLoop, QuizSource, SessionAction, StartedSession, StepOutcome,
};
