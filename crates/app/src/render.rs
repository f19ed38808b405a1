//! Plain-text rendering of session state and results.

use std::fmt::Write as _;

use quiz_core::QuizResult;
use quiz_core::model::{CardKind, QuizItem, UserStats};
use services::StatsService;
use services::sessions::{DailyStatus, SessionProgress};

pub fn daily_banner(status: DailyStatus) -> String {
    format!(
        "Daily quiz: {} cards remaining, {} day streak",
        status.remaining_count, status.streak_days
    )
}

/// The visible item with its choices, marking the captured answer.
pub fn item(progress: SessionProgress, item: &QuizItem, selected: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n[{}/{}] {:.0}% ({} answered)",
        progress.position,
        progress.total,
        progress.percent(),
        progress.answered
    );
    let _ = writeln!(out, "{}", item.card.prompt);

    match item.card.kind {
        CardKind::Mcq => {
            for (index, choice) in item.card.choices().iter().enumerate() {
                let marker = if selected == Some(choice.as_str()) { '*' } else { ' ' };
                let _ = writeln!(out, " {marker} {}. {choice}", index + 1);
            }
        }
        CardKind::TrueFalse => {
            for (key, value) in [('1', "true"), ('2', "false")] {
                let marker = if selected == Some(value) { '*' } else { ' ' };
                let _ = writeln!(out, " {marker} {key}. {value}");
            }
        }
        CardKind::Cloze => {
            if let Some(answer) = selected {
                let _ = writeln!(out, "   answer: {answer}");
            }
        }
    }

    let hint = if progress.is_last {
        "enter: submit  esc: skip  :prev  :submit  :quit"
    } else {
        "enter: next  esc: skip  :prev  :submit  :quit"
    };
    let _ = write!(out, "{hint}");
    out
}

/// Score summary, per-item review and weak tags of a graded quiz.
pub fn result(result: &QuizResult) -> String {
    let band = result.band();
    let mut out = String::new();
    let _ = writeln!(out, "\n{} {}", band.emoji(), band.message());
    let _ = writeln!(
        out,
        "Score: {:.1}% ({}/{} correct, {} incorrect) [{}]",
        result.score_percentage(),
        result.correct_count(),
        result.total_count(),
        result.incorrect_count(),
        band.color().as_str()
    );
    let _ = writeln!(out, "Average time: {:.1}s per question", result.average_time_sec());

    for outcome in result.items() {
        let mark = if outcome.is_correct { "ok" } else { "x " };
        let answer = outcome.user_answer.as_deref().unwrap_or("(no answer)");
        let _ = writeln!(out, "  {mark} {}. {}", outcome.position, outcome.prompt);
        if !outcome.is_correct {
            let _ = writeln!(out, "       yours: {answer}  correct: {}", outcome.correct_answer);
            if let Some(rationale) = &outcome.rationale {
                let _ = writeln!(out, "       {rationale}");
            }
        }
    }

    let weak: Vec<String> = result
        .weak_tags()
        .map(|tag| format!("{} ({:.0}%)", tag.tag, tag.accuracy_rate * 100.0))
        .collect();
    if !weak.is_empty() {
        let _ = writeln!(out, "Weak tags: {}", weak.join(", "));
    }

    if result.retry_eligible() {
        let _ = writeln!(out, "Retry available.");
    }
    let _ = write!(out, "{}", band.next_step());
    out
}

pub fn stats(stats: &UserStats, weak_limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Streak: {} days", stats.streak_days);
    let _ = writeln!(out, "Cards: {} total, {} due today", stats.total_cards, stats.due_today);
    let _ = writeln!(out, "Recommended study time: {} min", stats.recommended_study_time);
    let top = StatsService::top_weak_tags(stats, weak_limit);
    if top.is_empty() {
        let _ = write!(out, "No weak tags yet.");
    } else {
        let _ = writeln!(out, "Weak tags:");
        for tag in top {
            let _ = writeln!(
                out,
                "  {} {:.0}% ({}/{})",
                tag.tag,
                tag.accuracy_rate * 100.0,
                tag.correct_count,
                tag.total_count
            );
        }
    }
    out
}
