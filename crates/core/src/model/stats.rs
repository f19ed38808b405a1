use serde::{Deserialize, Serialize};

/// Historical accuracy for one tag, as computed upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagStats {
    pub tag: String,
    pub correct_count: u32,
    pub total_count: u32,
    pub accuracy_rate: f64,
}

/// Aggregate study statistics for the home screen.
///
/// Displayed verbatim; nothing here is recomputed locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub streak_days: u32,
    pub total_cards: u32,
    pub due_today: u32,
    /// Weakest first.
    #[serde(default)]
    pub weak_tags: Vec<TagStats>,
    /// Minutes.
    pub recommended_study_time: u32,
}
