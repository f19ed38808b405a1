use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a backend-assigned numeric identifier.
///
/// The backend hands out plain integers; wrapping them keeps a `CardId` from
/// being passed where a `QuizId` is expected.
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value
            #[must_use]
            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u64>().map(Self)
            }
        }
    };
}

numeric_id!(
    /// Owner of notes, cards and quizzes.
    UserId
);
numeric_id!(
    /// Note a card was generated from.
    NoteId
);
numeric_id!(
    /// Unique identifier for a Card
    CardId
);
numeric_id!(
    /// Unique identifier for a Quiz
    QuizId
);
numeric_id!(
    /// Identifier of one card slot inside a quiz.
    QuizItemId
);
