#![forbid(unsafe_code)]

pub mod model;
pub mod scoring;
pub mod time;

pub use scoring::{QuizResult, ScoreBand, ScoringError};
pub use time::{Clock, ManualTimer, MonotonicTimer, Timer};
