mod card;
mod ids;
mod quiz;
mod stats;
mod submission;

pub use ids::{CardId, NoteId, QuizId, QuizItemId, UserId};

pub use card::{Card, CardError, CardKind};
pub use quiz::{DailyQuiz, Quiz, QuizError, QuizItem};
pub use stats::{TagStats, UserStats};
pub use submission::{QuizSubmission, SubmittedAnswer};
