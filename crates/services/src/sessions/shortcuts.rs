//! Keyboard shortcuts for answering and navigating.
//!
//! The mapping is a pure function of the card kind, its choices and the key;
//! it never looks at session state. Whether `Enter` actually advances is the
//! controller's call.

use quiz_core::model::CardKind;

/// Host-agnostic key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Enter,
    Escape,
    Other,
}

impl KeyInput {
    /// Parses DOM-style key names (`"Enter"`, `"Escape"`, `"a"`, `"1"`).
    #[must_use]
    pub fn parse(key: &str) -> Self {
        match key {
            "Enter" | "Return" => KeyInput::Enter,
            "Escape" | "Esc" => KeyInput::Escape,
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyInput::Char(c),
                    _ => KeyInput::Other,
                }
            }
        }
    }
}

/// What a key means for the current item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shortcut {
    Answer(String),
    /// Go to the next item, if the current one has been answered.
    Advance,
    Skip,
    Ignored,
}

pub const TRUE_ANSWER: &str = "true";
pub const FALSE_ANSWER: &str = "false";

const MAX_CHOICE_KEYS: usize = 4;

/// Resolves a key against the current card.
#[must_use]
pub fn resolve(kind: CardKind, choices: &[String], key: KeyInput) -> Shortcut {
    match key {
        KeyInput::Enter => Shortcut::Advance,
        KeyInput::Escape => Shortcut::Skip,
        KeyInput::Other => Shortcut::Ignored,
        KeyInput::Char(c) => match kind {
            CardKind::Mcq => choice_for_digit(choices, c),
            CardKind::TrueFalse => match c {
                '1' | 't' | 'T' => Shortcut::Answer(TRUE_ANSWER.into()),
                '2' | 'f' | 'F' => Shortcut::Answer(FALSE_ANSWER.into()),
                _ => Shortcut::Ignored,
            },
            CardKind::Cloze => Shortcut::Ignored,
        },
    }
}

fn choice_for_digit(choices: &[String], c: char) -> Shortcut {
    let Some(digit) = c.to_digit(10) else {
        return Shortcut::Ignored;
    };
    let Some(index) = (digit as usize).checked_sub(1) else {
        return Shortcut::Ignored;
    };
    if index >= MAX_CHOICE_KEYS {
        return Shortcut::Ignored;
    }
    choices
        .get(index)
        .map_or(Shortcut::Ignored, |choice| Shortcut::Answer(choice.clone()))
}
