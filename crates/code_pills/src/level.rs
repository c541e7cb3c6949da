use bevy::prelude::*;
use strum::{Display, EnumIter};
use thiserror::Error;

/// How a level is answered: drag a pill into the blank, or tap one option.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum LevelKind {
    DragDrop,
    MultipleChoice,
}

/// Pill and slot width buckets, in logical pixels.
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter)]
pub enum SizeClass {
    Sm,
    Md,
    Lg,
    Xl,
    Xxl,
}

impl SizeClass {
    pub const fn width(self) -> f32 {
        match self {
            Self::Sm => 90.0,
            Self::Md => 120.0,
            Self::Lg => 150.0,
            Self::Xl => 200.0,
            Self::Xxl => 240.0,
        }
    }
}

/// One element of the code snippet shown above the options.
#[derive(Clone, Debug)]
pub enum CodeToken {
    Text { text: String, keyword: bool },
    Newline,
    Slot { size: SizeClass, answer: String },
}

#[derive(Clone, Debug)]
pub struct LevelOption {
    pub text: String,
    pub size: SizeClass,
}

#[derive(Clone, Debug)]
pub struct Level {
    pub kind: LevelKind,
    pub theme: Color,
    pub prompt: String,
    pub code: Vec<CodeToken>,
    pub options: Vec<LevelOption>,
    /// Expected answer for multiple choice levels. Drag levels keep the
    /// answer on their slot token instead.
    pub answer: Option<String>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LevelError {
    #[error("drag level `{prompt}` must contain exactly one slot, found {found}")]
    SlotCount { prompt: String, found: usize },
    #[error("choice level `{prompt}` is missing an expected answer")]
    MissingAnswer { prompt: String },
    #[error("expected answer `{answer}` is not one of the offered options")]
    AnswerNotOffered { answer: String },
}

impl Level {
    pub fn slot_token(&self) -> Option<(&SizeClass, &str)> {
        self.code.iter().find_map(|token| match token {
            CodeToken::Slot { size, answer } => Some((size, answer.as_str())),
            _ => None,
        })
    }

    /// Catches malformed catalog entries at startup. Gameplay assumes
    /// well-formed data after this.
    pub fn validate(&self) -> Result<(), LevelError> {
        let slots = self
            .code
            .iter()
            .filter(|t| matches!(t, CodeToken::Slot { .. }))
            .count();
        match self.kind {
            LevelKind::DragDrop => {
                if slots != 1 {
                    return Err(LevelError::SlotCount {
                        prompt: self.prompt.clone(),
                        found: slots,
                    });
                }
                let expected = self
                    .slot_token()
                    .map(|(_, answer)| answer.to_owned())
                    .unwrap_or_default();
                self.require_offered(&expected)
            }
            LevelKind::MultipleChoice => {
                let Some(expected) = self.answer.as_deref() else {
                    return Err(LevelError::MissingAnswer {
                        prompt: self.prompt.clone(),
                    });
                };
                self.require_offered(expected)
            }
        }
    }

    fn require_offered(&self, expected: &str) -> Result<(), LevelError> {
        if self.options.iter().any(|o| o.text == expected) {
            Ok(())
        } else {
            Err(LevelError::AnswerNotOffered {
                answer: expected.to_owned(),
            })
        }
    }
}

#[derive(Resource)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<Level>) -> Self {
        Self { levels }
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }

    pub fn built_in() -> Self {
        Self::new(vec![
            Level {
                kind: LevelKind::DragDrop,
                theme: THEME_PINK,
                prompt: "Complete the variable declaration:".into(),
                code: vec![
                    kw("const"),
                    t(" name = "),
                    slot(SizeClass::Md, "'Alice'"),
                    t(";"),
                ],
                options: vec![
                    opt("123", SizeClass::Md),
                    opt("'Alice'", SizeClass::Md),
                    opt("true", SizeClass::Md),
                    opt("null", SizeClass::Md),
                ],
                answer: None,
            },
            Level {
                kind: LevelKind::MultipleChoice,
                theme: THEME_CYAN,
                prompt: "What does this output?".into(),
                code: vec![
                    kw("console"),
                    t("."),
                    kw("log"),
                    t("("),
                    t("'Hello'"),
                    t(")"),
                    t(";"),
                ],
                options: vec![
                    opt("Error", SizeClass::Lg),
                    opt("Hello", SizeClass::Lg),
                    opt("undefined", SizeClass::Lg),
                ],
                answer: Some("Hello".into()),
            },
            Level {
                kind: LevelKind::DragDrop,
                theme: THEME_PURPLE,
                prompt: "Loop through the array:".into(),
                code: vec![
                    kw("for"),
                    t(" (let i = 0; "),
                    CodeToken::Newline,
                    t("     i < arr."),
                    slot(SizeClass::Md, "length"),
                    t("; i++) {"),
                    CodeToken::Newline,
                    t("}"),
                ],
                options: vec![
                    opt("size", SizeClass::Md),
                    opt("length", SizeClass::Md),
                    opt("count", SizeClass::Md),
                ],
                answer: None,
            },
            Level {
                kind: LevelKind::MultipleChoice,
                theme: THEME_ORANGE,
                prompt: "Select the correct boolean:".into(),
                code: vec![kw("let"), t(" isGameOver = "), kw("___"), t(";")],
                options: vec![
                    opt("false", SizeClass::Md),
                    opt("'false'", SizeClass::Md),
                    opt("0", SizeClass::Md),
                    opt("null", SizeClass::Md),
                ],
                answer: Some("false".into()),
            },
            Level {
                kind: LevelKind::DragDrop,
                theme: THEME_GREEN,
                prompt: "Push an item to the list:".into(),
                code: vec![t("items."), slot(SizeClass::Lg, "push"), t("(newItem);")],
                options: vec![
                    opt("insert", SizeClass::Lg),
                    opt("add", SizeClass::Lg),
                    opt("push", SizeClass::Lg),
                    opt("append", SizeClass::Lg),
                ],
                answer: None,
            },
        ])
    }
}

pub const THEME_PINK: Color = Color::srgb(1.0, 0.2, 0.4);
pub const THEME_CYAN: Color = Color::srgb(0.0, 0.761, 1.0);
pub const THEME_PURPLE: Color = Color::srgb(0.616, 0.0, 1.0);
pub const THEME_ORANGE: Color = Color::srgb(1.0, 0.584, 0.0);
pub const THEME_GREEN: Color = Color::srgb(0.0, 0.902, 0.463);

/// Ink used for plain code tokens.
pub const CODE_INK: Color = Color::srgb(0.216, 0.255, 0.318);

fn t(text: &str) -> CodeToken {
    CodeToken::Text {
        text: text.into(),
        keyword: false,
    }
}

fn kw(text: &str) -> CodeToken {
    CodeToken::Text {
        text: text.into(),
        keyword: true,
    }
}

fn slot(size: SizeClass, answer: &str) -> CodeToken {
    CodeToken::Slot {
        size,
        answer: answer.into(),
    }
}

fn opt(text: &str, size: SizeClass) -> LevelOption {
    LevelOption {
        text: text.into(),
        size,
    }
}
