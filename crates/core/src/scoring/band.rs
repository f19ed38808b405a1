/// Qualitative band for a score percentage.
///
/// Lower bounds are inclusive: 90 is `Celebratory`, 80 is `Positive`,
/// 60 is `NeutralPositive`. Every percentage (including values outside
/// `[0, 100]`) lands in exactly one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreBand {
    Celebratory,
    Positive,
    NeutralPositive,
    Retry,
}

/// Display color class for a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreColor {
    Green,
    Yellow,
    Red,
}

pub const CELEBRATORY_THRESHOLD: f64 = 90.0;
pub const POSITIVE_THRESHOLD: f64 = 80.0;
pub const NEUTRAL_THRESHOLD: f64 = 60.0;

/// Results below this percentage offer a retry action.
pub const RETRY_THRESHOLD: f64 = POSITIVE_THRESHOLD;

impl ScoreBand {
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= CELEBRATORY_THRESHOLD {
            ScoreBand::Celebratory
        } else if percentage >= POSITIVE_THRESHOLD {
            ScoreBand::Positive
        } else if percentage >= NEUTRAL_THRESHOLD {
            ScoreBand::NeutralPositive
        } else {
            // NaN also ends up here.
            ScoreBand::Retry
        }
    }

    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            ScoreBand::Celebratory => "🎉",
            ScoreBand::Positive => "😊",
            ScoreBand::NeutralPositive => "🙂",
            ScoreBand::Retry => "😔",
        }
    }

    #[must_use]
    pub fn color(self) -> ScoreColor {
        match self {
            ScoreBand::Celebratory | ScoreBand::Positive => ScoreColor::Green,
            ScoreBand::NeutralPositive => ScoreColor::Yellow,
            ScoreBand::Retry => ScoreColor::Red,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ScoreBand::Celebratory => "Outstanding result!",
            ScoreBand::Positive => "Very well done!",
            ScoreBand::NeutralPositive => "Good progress!",
            ScoreBand::Retry => "Let's review and try again!",
        }
    }

    /// Follow-up guidance shown under the result.
    #[must_use]
    pub fn next_step(self) -> &'static str {
        match self {
            ScoreBand::Celebratory | ScoreBand::Positive => {
                "Great work! Keep up this pace."
            }
            ScoreBand::NeutralPositive | ScoreBand::Retry => {
                "Review the cards you missed and aim higher next time."
            }
        }
    }
}

impl ScoreColor {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreColor::Green => "green",
            ScoreColor::Yellow => "yellow",
            ScoreColor::Red => "red",
        }
    }
}
