use std::fmt;
use std::sync::LazyLock;

use fancy_regex::{Regex, RegexBuilder};

/// Left of the first `=` is the field name, everything after it is the
/// expected value (which may itself contain `=`).
const DEPENDENCY_KEY_PATTERN: &str = r"^([^=]*)=(.*)$";

static DEPENDENCY_KEY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    RegexBuilder::new(DEPENDENCY_KEY_PATTERN)
        .dot_matches_new_line(true)
        .build()
        .ok()
});

/// Polarity of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependMode {
    /// Shown while the controller value matches.
    On,
    /// Shown while the controller value does not match.
    Off,
}

impl DependMode {
    pub fn attribute(self) -> &'static str {
        match self {
            Self::On => "data-depends-on",
            Self::Off => "data-depends-off",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyKey {
    pub field: String,
    pub expected: String,
}

impl DependencyKey {
    pub fn new(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
        }
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.expected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    pub key: DependencyKey,
    pub mode: DependMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingSeparator,
    EmptyFieldName,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => f.write_str("missing '=' separator"),
            Self::EmptyFieldName => f.write_str("empty field name"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyParse {
    Parsed(DependencyKey),
    Skipped(SkipReason),
}

pub fn parse_dependency_key(raw: &str) -> KeyParse {
    let Some(regex) = DEPENDENCY_KEY.as_ref() else {
        return KeyParse::Skipped(SkipReason::MissingSeparator);
    };
    let Ok(Some(captures)) = regex.captures(raw) else {
        return KeyParse::Skipped(SkipReason::MissingSeparator);
    };
    let field = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let expected = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
    if field.is_empty() {
        return KeyParse::Skipped(SkipReason::EmptyFieldName);
    }
    KeyParse::Parsed(DependencyKey::new(field, expected))
}

impl DependencyDeclaration {
    pub fn parse(raw: &str, mode: DependMode) -> std::result::Result<Self, SkipReason> {
        match parse_dependency_key(raw) {
            KeyParse::Parsed(key) => Ok(Self { key, mode }),
            KeyParse::Skipped(reason) => Err(reason),
        }
    }
}
