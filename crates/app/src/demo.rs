//! Seeded in-memory backend for trying the quiz flow offline.

use chrono::{DateTime, Utc};
use gateway::{GatewayError, InMemoryGateway};
use quiz_core::Clock;
use quiz_core::model::{
    Card, CardId, CardKind, NoteId, Quiz, QuizId, QuizItem, QuizItemId, TagStats, UserId,
    UserStats,
};

pub const DEMO_QUIZ_ID: QuizId = QuizId::new(1);

const USER: UserId = UserId::new(1);

struct Seed {
    kind: CardKind,
    prompt: &'static str,
    answer: &'static str,
    choices: &'static [&'static str],
    tags: &'static [&'static str],
    rationale: &'static str,
}

const SEEDS: &[Seed] = &[
    Seed {
        kind: CardKind::Mcq,
        prompt: "Which keyword declares an immutable binding in Rust?",
        answer: "let",
        choices: &["var", "let", "mut", "const fn"],
        tags: &["rust", "syntax"],
        rationale: "`let` binds immutably unless followed by `mut`.",
    },
    Seed {
        kind: CardKind::TrueFalse,
        prompt: "A `&mut T` may coexist with another `&T` to the same value.",
        answer: "false",
        choices: &[],
        tags: &["rust", "ownership"],
        rationale: "A mutable borrow is exclusive for its whole lifetime.",
    },
    Seed {
        kind: CardKind::Cloze,
        prompt: "The trait used for fallible conversions is ___.",
        answer: "TryFrom",
        choices: &[],
        tags: &["rust", "traits"],
        rationale: "`TryFrom` returns a `Result`, unlike `From`.",
    },
    Seed {
        kind: CardKind::Mcq,
        prompt: "Which smart pointer gives shared ownership across threads?",
        answer: "Arc",
        choices: &["Rc", "Box", "Arc", "Cell"],
        tags: &["ownership", "concurrency"],
        rationale: "`Arc` uses atomic reference counting; `Rc` is single-threaded.",
    },
];

fn card(index: usize, seed: &Seed, created_at: DateTime<Utc>) -> Card {
    let id = index as u64 + 1;
    Card {
        id: CardId::new(id),
        user_id: USER,
        note_id: NoteId::new(id),
        kind: seed.kind,
        prompt: seed.prompt.into(),
        answer: seed.answer.into(),
        choices: (!seed.choices.is_empty())
            .then(|| seed.choices.iter().map(|c| (*c).to_string()).collect()),
        tags: Some(seed.tags.iter().map(|t| (*t).to_string()).collect()),
        rationale: Some(seed.rationale.into()),
        created_at,
    }
}

fn quiz(created_at: DateTime<Utc>) -> Quiz {
    Quiz {
        id: DEMO_QUIZ_ID,
        user_id: USER,
        title: Some("Rust basics".into()),
        completed: false,
        score: None,
        created_at,
        completed_at: None,
        quiz_items: SEEDS
            .iter()
            .enumerate()
            .map(|(index, seed)| {
                QuizItem::new(
                    QuizItemId::new(index as u64 + 100),
                    card(index, seed, created_at),
                )
            })
            .collect(),
    }
}

fn stats() -> UserStats {
    UserStats {
        streak_days: 3,
        total_cards: SEEDS.len() as u32,
        due_today: SEEDS.len() as u32,
        weak_tags: vec![
            TagStats {
                tag: "ownership".into(),
                correct_count: 2,
                total_count: 5,
                accuracy_rate: 0.4,
            },
            TagStats {
                tag: "traits".into(),
                correct_count: 3,
                total_count: 5,
                accuracy_rate: 0.6,
            },
        ],
        recommended_study_time: 10,
    }
}

/// Builds a gateway serving one daily quiz and canned statistics.
///
/// # Errors
///
/// Returns `GatewayError` if seeding the in-memory state fails.
pub fn seeded_gateway(clock: Clock) -> Result<InMemoryGateway, GatewayError> {
    let gateway = InMemoryGateway::new(clock);
    gateway.insert_quiz(quiz(clock.now()))?;
    gateway.set_daily(DEMO_QUIZ_ID, SEEDS.len() as u32, 3)?;
    gateway.set_stats(stats())?;
    Ok(gateway)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[test]
    fn seeded_quiz_is_valid() {
        let seeded = quiz(fixed_now());
        assert!(seeded.validate().is_ok());
        assert_eq!(seeded.len(), SEEDS.len());
    }

    #[tokio::test]
    async fn seeded_gateway_serves_daily_quiz() {
        use gateway::{QuizGateway, RequestContext};

        let gateway = seeded_gateway(Clock::fixed(fixed_now())).unwrap();
        let daily = gateway.daily_quiz(&RequestContext::anonymous()).await.unwrap();
        assert_eq!(daily.quiz.id, DEMO_QUIZ_ID);
        assert_eq!(daily.streak_days, 3);
    }
}
