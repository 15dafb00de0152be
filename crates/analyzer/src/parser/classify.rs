//! Classify — content-based guess at the role of a single token.
//!
//! Rules are evaluated top to bottom and the first match wins. The order is
//! significant: `ERROR` is also a valid logger name, and a bare identifier is
//! also valid message text.

use std::sync::OnceLock;

use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use thiserror::Error;

use super::model::FieldKind;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Invalid {kind} pattern: {reason}")]
    InvalidPattern { kind: FieldKind, reason: String },
}

/// Built-in field patterns.
pub struct Patterns;

impl Patterns {
    /// ISO-8601 date-time with seconds, 3–9 fractional digits and `Z` or a
    /// numeric offset (`+05:30` / `+0530`).
    pub const TIMESTAMP: &'static str = r"^\s*[0-9]{4}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12][0-9]|3[01])T(?:[01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]\.[0-9]{3,9}(?:Z|[+-][0-9]{2}:?[0-9]{2})\s*$";
    pub const LEVEL: &'static str = r"^\s*(?:TRACE|DEBUG|INFO|WARN|ERROR|FATAL)\s*$";
    pub const LOGGER: &'static str = r"^\s*[A-Za-z0-9_.\-]+\s*$";
    pub const FILE_POSITION: &'static str = r"^.*:[0-9]+$";
    pub const DETAILS_JSON: &'static str = r"^\s*\{.*\}\s*$";
    pub const MESSAGE: &'static str = r"^[A-Za-z0-9\s\-/:()]+$";

    /// Precedence order used by [`FieldClassifier`].
    pub const ORDERED: [(FieldKind, &'static str); 6] = [
        (FieldKind::Timestamp, Self::TIMESTAMP),
        (FieldKind::Level, Self::LEVEL),
        (FieldKind::Logger, Self::LOGGER),
        (FieldKind::FilePosition, Self::FILE_POSITION),
        (FieldKind::DetailsJson, Self::DETAILS_JSON),
        (FieldKind::Message, Self::MESSAGE),
    ];
}

/// Ordered first-match-wins table of `(kind, matcher)` rules.
pub struct FieldClassifier {
    rules: Vec<(FieldKind, RegexMatcher)>,
}

impl FieldClassifier {
    pub fn new() -> Result<Self, ClassifierError> {
        let rules = Patterns::ORDERED
            .iter()
            .map(|(kind, pattern)| {
                RegexMatcherBuilder::new()
                    .multi_line(false)
                    .build(pattern)
                    .map(|matcher| (*kind, matcher))
                    .map_err(|e| ClassifierError::InvalidPattern {
                        kind: *kind,
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules })
    }

    /// Process-wide classifier built from [`Patterns`].
    pub fn shared() -> &'static FieldClassifier {
        static SHARED: OnceLock<FieldClassifier> = OnceLock::new();
        SHARED.get_or_init(|| {
            FieldClassifier::new().expect("built-in field patterns must compile")
        })
    }

    /// Guess the kind of `token`. `None` means no rule matched.
    pub fn classify(&self, token: &str) -> Option<FieldKind> {
        self.rules
            .iter()
            .find(|(_, matcher)| matcher.is_match(token.as_bytes()).unwrap_or(false))
            .map(|(kind, _)| *kind)
    }
}
