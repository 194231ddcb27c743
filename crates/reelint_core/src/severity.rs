//! Severity scale and override resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::preferences::UserIssuePreference;

/// Severity level of a violation.
///
/// Levels are ordered from most to least severe. Moving "up" goes toward
/// [`Severity::Critical`]; moving "down" goes toward [`Severity::Ignored`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Breaks the video; must be fixed.
    Critical,
    /// Noticeably hurts performance.
    Moderate,
    /// Polish item.
    Minor,
    /// Muted by the user; carries no deduction.
    Ignored,
}

/// Errors from parsing or assigning a severity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeverityError {
    #[error("Unknown severity: {0:?}")]
    Unknown(String),

    #[error("Severity {0} cannot be used as a baseline")]
    NotAssignable(Severity),
}

impl Severity {
    /// All levels, most severe first.
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::Moderate,
        Severity::Minor,
        Severity::Ignored,
    ];

    /// Position on the scale. `0` is the most severe.
    pub const fn rank(self) -> usize {
        match self {
            Severity::Critical => 0,
            Severity::Moderate => 1,
            Severity::Minor => 2,
            Severity::Ignored => 3,
        }
    }

    /// Point deduction applied to the category score.
    pub const fn points(self) -> i32 {
        match self {
            Severity::Critical => -10,
            Severity::Moderate => -5,
            Severity::Minor => -2,
            Severity::Ignored => 0,
        }
    }

    /// The next less severe level, or `None` at [`Severity::Ignored`].
    pub fn next(self) -> Option<Severity> {
        Self::ALL.get(self.rank() + 1).copied()
    }

    /// The next more severe level, or `None` at [`Severity::Critical`].
    pub fn prev(self) -> Option<Severity> {
        self.rank()
            .checked_sub(1)
            .and_then(|rank| Self::ALL.get(rank).copied())
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Moderate => "moderate",
            Severity::Minor => "minor",
            Severity::Ignored => "ignored",
        }
    }

    /// Returns true for levels a rule baseline or a stored original may take.
    pub const fn is_assignable(self) -> bool {
        !matches!(self, Severity::Ignored)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = SeverityError;

    /// Accepts the lowercase names only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Severity::Critical),
            "moderate" => Ok(Severity::Moderate),
            "minor" => Ok(Severity::Minor),
            "ignored" => Ok(Severity::Ignored),
            _ => Err(SeverityError::Unknown(s.to_string())),
        }
    }
}

/// String form of [`Severity::next`]. Unknown input yields `None`.
pub fn get_next_severity(current: &str) -> Option<Severity> {
    current.parse::<Severity>().ok().and_then(Severity::next)
}

/// String form of [`Severity::prev`]. Unknown input yields `None`.
pub fn get_prev_severity(current: &str) -> Option<Severity> {
    current.parse::<Severity>().ok().and_then(Severity::prev)
}

/// Picks the severity used for scoring.
///
/// A stored preference always wins over the rule-assigned level.
pub fn resolve_effective_severity(
    rule_severity: Severity,
    preference: Option<&UserIssuePreference>,
) -> Severity {
    preference.map_or(rule_severity, |pref| pref.severity)
}
