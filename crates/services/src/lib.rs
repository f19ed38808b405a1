#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod sessions;
pub mod stats_service;

pub use quiz_core::Timer;
pub use sessions as session;

pub use config::SessionConfig;
pub use error::{LoadFailure, SessionError, StatsServiceError, SubmitFailure};
pub use stats_service::{DEFAULT_WEAK_TAG_LIMIT, StatsService};

pub use sessions::{
    KeyInput, QuizController, QuizSessionLoop, QuizSource, SessionAction, SessionPhase,
    StartedSession, StepOutcome,
};
