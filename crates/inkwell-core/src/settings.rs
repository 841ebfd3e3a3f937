//! Writing mode and the providers that answer "which mode are we in".

use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// `Normal` drains the gauge when typing pauses; `Zen` freezes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritingMode {
    #[default]
    Normal,
    Zen,
}

impl fmt::Display for WritingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WritingMode::Normal => f.write_str("normal"),
            WritingMode::Zen => f.write_str("zen"),
        }
    }
}

impl FromStr for WritingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(WritingMode::Normal),
            "zen" => Ok(WritingMode::Zen),
            other => Err(format!("unknown writing mode: {other}")),
        }
    }
}

/// Source of the writing mode, queried on every tick.
pub trait SettingsProvider {
    fn writing_mode(&self) -> WritingMode;
}

/// Settings held in memory; the mode can be flipped mid-session.
#[derive(Debug, Default)]
pub struct FixedSettings {
    mode: Cell<WritingMode>,
}

impl FixedSettings {
    pub fn new(mode: WritingMode) -> Self {
        Self {
            mode: Cell::new(mode),
        }
    }

    pub fn set_mode(&self, mode: WritingMode) {
        self.mode.set(mode);
    }
}

impl SettingsProvider for FixedSettings {
    fn writing_mode(&self) -> WritingMode {
        self.mode.get()
    }
}

impl SettingsProvider for WritingMode {
    fn writing_mode(&self) -> WritingMode {
        *self
    }
}

impl<S: SettingsProvider + ?Sized> SettingsProvider for &S {
    fn writing_mode(&self) -> WritingMode {
        (**self).writing_mode()
    }
}
