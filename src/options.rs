use serde::Deserialize;

use crate::adapter::VisibilityAction;
use crate::selector::parse_selector_groups;
use crate::{Error, Result};

/// Selector identifying a question region when none is configured.
pub const DEFAULT_QUESTION_SELECTOR: &str = ".sq-form-question";

/// Animation family used for show/hide transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    #[default]
    Slide,
    Fade,
}

impl Effect {
    pub fn show_action(self) -> VisibilityAction {
        match self {
            Self::Slide => VisibilityAction::SlideDown,
            Self::Fade => VisibilityAction::FadeIn,
        }
    }

    pub fn hide_action(self) -> VisibilityAction {
        match self {
            Self::Slide => VisibilityAction::SlideUp,
            Self::Fade => VisibilityAction::FadeOut,
        }
    }
}

/// Animation length. Named speeds follow the usual `fast`/`slow` table;
/// unknown names fall back to [`Duration::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "RawDuration")]
pub enum Duration {
    #[default]
    Fast,
    Slow,
    Default,
    Millis(u64),
}

impl Duration {
    pub fn millis(self) -> u64 {
        match self {
            Self::Fast => 200,
            Self::Slow => 600,
            Self::Default => 400,
            Self::Millis(ms) => ms,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "fast" => Self::Fast,
            "slow" => Self::Slow,
            _ => Self::Default,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Millis(u64),
    Named(String),
}

impl From<RawDuration> for Duration {
    fn from(raw: RawDuration) -> Self {
        match raw {
            RawDuration::Millis(ms) => Self::Millis(ms),
            RawDuration::Named(name) => Self::from_name(&name),
        }
    }
}

/// Controller configuration. Every field is optional when deserialised;
/// missing ones keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    pub effect: Effect,
    pub duration: Duration,
    pub question_selector: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            effect: Effect::default(),
            duration: Duration::default(),
            question_selector: DEFAULT_QUESTION_SELECTOR.to_string(),
        }
    }
}

impl Options {
    pub fn from_json(raw: &str) -> Result<Self> {
        let options: Self =
            serde_json::from_str(raw).map_err(|err| Error::InvalidOptions(err.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_question_selector(mut self, selector: impl Into<String>) -> Self {
        self.question_selector = selector.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        parse_selector_groups(&self.question_selector).map_err(|err| {
            Error::InvalidOptions(format!("question_selector: {err}"))
        })?;
        Ok(())
    }
}
