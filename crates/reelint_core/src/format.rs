//! Video formats and scoring categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LinterError;

/// Structural category of a short-form video. Selects the active rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoFormat {
    /// A person speaking to camera.
    TalkingHead,
    /// Game footage, with or without commentary.
    Gameplay,
    /// Product or software walkthrough.
    Demo,
    /// Anything else.
    Other,
}

impl VideoFormat {
    pub const ALL: [VideoFormat; 4] = [
        VideoFormat::TalkingHead,
        VideoFormat::Gameplay,
        VideoFormat::Demo,
        VideoFormat::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            VideoFormat::TalkingHead => "talking_head",
            VideoFormat::Gameplay => "gameplay",
            VideoFormat::Demo => "demo",
            VideoFormat::Other => "other",
        }
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoFormat {
    type Err = LinterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "talking_head" => Ok(VideoFormat::TalkingHead),
            "gameplay" => Ok(VideoFormat::Gameplay),
            "demo" => Ok(VideoFormat::Demo),
            "other" => Ok(VideoFormat::Other),
            _ => Err(LinterError::InvalidFormat(s.to_string())),
        }
    }
}

/// Scoring bucket a violation counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    HookStrength,
    StructurePacing,
    DeliveryPerformance,
    ValueClarity,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::HookStrength,
        Category::StructurePacing,
        Category::DeliveryPerformance,
        Category::ValueClarity,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Category::HookStrength => "hook_strength",
            Category::StructurePacing => "structure_pacing",
            Category::DeliveryPerformance => "delivery_performance",
            Category::ValueClarity => "value_clarity",
        }
    }

    /// Parses the canonical name plus the short aliases analyzers tend to emit.
    pub fn parse(s: &str) -> Option<Category> {
        let normalized = s
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_")
            .to_ascii_lowercase();
        match normalized.as_str() {
            "hook_strength" | "hook" => Some(Category::HookStrength),
            "structure_pacing" | "structure_and_pacing" | "structure" | "pacing" => {
                Some(Category::StructurePacing)
            }
            "delivery_performance" | "delivery" | "performance" => {
                Some(Category::DeliveryPerformance)
            }
            "value_clarity" | "value" | "clarity" => Some(Category::ValueClarity),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
