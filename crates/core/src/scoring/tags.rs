use std::collections::BTreeMap;

use crate::model::QuizItem;

/// Tags answered correctly less often than this are reported as weak.
pub const WEAK_TAG_THRESHOLD: f64 = 0.7;

/// Per-tag correctness within one graded quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct TagRollup {
    pub tag: String,
    pub correct_count: u32,
    pub total_count: u32,
    pub accuracy_rate: f64,
}

impl TagRollup {
    #[must_use]
    pub fn is_weak(&self) -> bool {
        self.accuracy_rate < WEAK_TAG_THRESHOLD
    }
}

/// Groups items by every tag on their card, weakest first.
///
/// Ties are broken by tag name so the order is stable. A card listing the
/// same tag twice counts once for that tag.
pub(crate) fn rollup(items: &[QuizItem]) -> Vec<TagRollup> {
    let mut counts: BTreeMap<&str, (u32, u32)> = BTreeMap::new();

    for item in items {
        let correct = item.is_correct == Some(true);
        let mut tags: Vec<&str> = item.card.tags().iter().map(String::as_str).collect();
        tags.sort_unstable();
        tags.dedup();
        for tag in tags {
            let entry = counts.entry(tag).or_insert((0, 0));
            entry.1 = entry.1.saturating_add(1);
            if correct {
                entry.0 = entry.0.saturating_add(1);
            }
        }
    }

    let mut rollups: Vec<TagRollup> = counts
        .into_iter()
        .map(|(tag, (correct_count, total_count))| TagRollup {
            tag: tag.to_owned(),
            correct_count,
            total_count,
            accuracy_rate: f64::from(correct_count) / f64::from(total_count),
        })
        .collect();

    rollups.sort_by(|a, b| {
        a.accuracy_rate
            .total_cmp(&b.accuracy_rate)
            .then_with(|| a.tag.cmp(&b.tag))
    });
    rollups
}
