//! Built-in rule catalog.
//!
//! Each format has its own ordered rule table. Descriptions are sent to the
//! analyzer verbatim as evaluation instructions, so they describe the
//! failure condition, not the fix.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::RuleOption;
use crate::format::{Category, VideoFormat};
use crate::severity::Severity;
use crate::LinterError;

/// A deterministic, named check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleSpec {
    /// Stable identifier; doubles as the issue key.
    pub id: &'static str,
    /// Short label shown to users.
    pub title: &'static str,
    /// Failure condition, phrased for the analyzer.
    pub description: &'static str,
    /// Baseline severity before user overrides.
    pub severity: Severity,
    pub category: Category,
}

impl RuleSpec {
    const fn new(
        id: &'static str,
        title: &'static str,
        description: &'static str,
        severity: Severity,
        category: Category,
    ) -> Self {
        Self {
            id,
            title,
            description,
            severity,
            category,
        }
    }
}

use Category::{DeliveryPerformance, HookStrength, StructurePacing, ValueClarity};
use Severity::{Critical, Minor, Moderate};

static TALKING_HEAD_RULES: &[RuleSpec] = &[
    RuleSpec::new(
        "weak_hook",
        "Weak hook",
        "The first 3 seconds give the viewer no reason to keep watching: no bold claim, question, curiosity gap or visual pattern interrupt.",
        Critical,
        HookStrength,
    ),
    RuleSpec::new(
        "delayed_subject",
        "Speaker appears late",
        "The speaker is not clearly on screen within the first second.",
        Moderate,
        HookStrength,
    ),
    RuleSpec::new(
        "slow_intro",
        "Slow intro",
        "The video spends time on greetings, self-introduction or preamble (\"hey guys, welcome back\") before the core point.",
        Moderate,
        StructurePacing,
    ),
    RuleSpec::new(
        "dead_air",
        "Dead air",
        "Pauses, filler words or breaths longer than about one second were left in instead of being cut.",
        Minor,
        StructurePacing,
    ),
    RuleSpec::new(
        "poor_audio",
        "Poor audio",
        "Background noise, echo, clipping or low volume makes the speech hard to understand.",
        Critical,
        DeliveryPerformance,
    ),
    RuleSpec::new(
        "low_energy_delivery",
        "Low energy delivery",
        "The speaker sounds monotone or hesitant, with flat facial expression and little vocal variety.",
        Moderate,
        DeliveryPerformance,
    ),
    RuleSpec::new(
        "missing_captions",
        "Missing captions",
        "There are no on-screen captions for the spoken words, so the video fails with sound off.",
        Moderate,
        DeliveryPerformance,
    ),
    RuleSpec::new(
        "poor_framing",
        "Poor framing",
        "The face is off-center, cropped awkwardly for a vertical frame, or the speaker avoids the camera.",
        Minor,
        DeliveryPerformance,
    ),
    RuleSpec::new(
        "unclear_takeaway",
        "Unclear takeaway",
        "After watching, a viewer could not state the single main point or lesson of the video.",
        Moderate,
        ValueClarity,
    ),
    RuleSpec::new(
        "missing_payoff",
        "Missing payoff",
        "The promise made in the hook is never delivered, or is delivered only vaguely.",
        Moderate,
        ValueClarity,
    ),
    RuleSpec::new(
        "no_call_to_action",
        "No call to action",
        "The video ends without telling the viewer what to do next (follow, comment, watch part two).",
        Minor,
        StructurePacing,
    ),
];

static GAMEPLAY_RULES: &[RuleSpec] = &[
    RuleSpec::new(
        "no_hook_moment",
        "No hook moment",
        "The first 3 seconds show menus, loading screens or calm play instead of a highlight, fail or clutch moment.",
        Critical,
        HookStrength,
    ),
    RuleSpec::new(
        "no_stakes",
        "No stakes",
        "The viewer is never told what is at stake or what the player is trying to achieve.",
        Moderate,
        HookStrength,
    ),
    RuleSpec::new(
        "dead_gameplay",
        "Dead gameplay",
        "Stretches longer than about 3 seconds where nothing meaningful happens on screen.",
        Moderate,
        StructurePacing,
    ),
    RuleSpec::new(
        "late_climax",
        "Late climax",
        "The best moment happens in the final 30% of the video with little build-up before it.",
        Moderate,
        StructurePacing,
    ),
    RuleSpec::new(
        "bad_vertical_crop",
        "Bad vertical crop",
        "The vertical crop cuts off the action, the crosshair or the character being followed.",
        Moderate,
        DeliveryPerformance,
    ),
    RuleSpec::new(
        "hud_clutter",
        "HUD clutter",
        "Game HUD, overlays or stickers cover the part of the screen where the action happens.",
        Minor,
        DeliveryPerformance,
    ),
    RuleSpec::new(
        "game_audio_overpowers",
        "Game audio overpowers voice",
        "Game sound effects or music drown out the commentary.",
        Moderate,
        DeliveryPerformance,
    ),
    RuleSpec::new(
        "no_context",
        "No context",
        "A viewer unfamiliar with the game cannot tell what happened or why it was impressive.",
        Moderate,
        ValueClarity,
    ),
    RuleSpec::new(
        "flat_ending",
        "Flat ending",
        "The video trails off after the highlight with no reaction, result screen or loop point.",
        Minor,
        ValueClarity,
    ),
];

static DEMO_RULES: &[RuleSpec] = &[
    RuleSpec::new(
        "no_problem_statement",
        "No problem statement",
        "The opening does not state the problem being solved or the outcome the viewer will get.",
        Critical,
        HookStrength,
    ),
    RuleSpec::new(
        "slow_setup",
        "Slow setup",
        "Sign-up, login, loading or configuration steps are shown instead of being cut.",
        Moderate,
        StructurePacing,
    ),
    RuleSpec::new(
        "unreadable_screen",
        "Unreadable screen",
        "Interface text or code is too small to read on a phone and is not zoomed or highlighted.",
        Critical,
        DeliveryPerformance,
    ),
    RuleSpec::new(
        "cursor_wandering",
        "Wandering cursor",
        "The cursor moves aimlessly, making it hard to follow what is being clicked.",
        Minor,
        DeliveryPerformance,
    ),
    RuleSpec::new(
        "feature_dump",
        "Feature dump",
        "Features are listed one after another without showing the benefit of any of them.",
        Moderate,
        ValueClarity,
    ),
    RuleSpec::new(
        "missing_result",
        "Missing result",
        "The finished outcome of the workflow is never shown on screen.",
        Moderate,
        ValueClarity,
    ),
    RuleSpec::new(
        "no_call_to_action",
        "No call to action",
        "The video ends without telling the viewer where to try the product or what to do next.",
        Minor,
        StructurePacing,
    ),
];

static OTHER_RULES: &[RuleSpec] = &[
    RuleSpec::new(
        "weak_opening",
        "Weak opening",
        "The first 3 seconds have no motion, text or sound that grabs attention.",
        Critical,
        HookStrength,
    ),
    RuleSpec::new(
        "static_visuals",
        "Static visuals",
        "The frame does not change (cut, zoom, movement or new text) for more than about 3 seconds.",
        Moderate,
        StructurePacing,
    ),
    RuleSpec::new(
        "abrupt_ending",
        "Abrupt ending",
        "The video cuts off mid-action or mid-sentence without a clear end or loop.",
        Minor,
        StructurePacing,
    ),
    RuleSpec::new(
        "poor_audio_mix",
        "Poor audio mix",
        "Music, voice and effects are unbalanced, or the audio is distorted.",
        Moderate,
        DeliveryPerformance,
    ),
    RuleSpec::new(
        "text_overload",
        "Text overload",
        "On-screen text is too long to read in the time it is shown or sits in the platform's UI safe zone.",
        Minor,
        DeliveryPerformance,
    ),
    RuleSpec::new(
        "unclear_subject",
        "Unclear subject",
        "It is not clear what the video is about or who it is for.",
        Moderate,
        ValueClarity,
    ),
];

/// Rule table for a format, in evaluation order.
pub fn rules_for(format: VideoFormat) -> &'static [RuleSpec] {
    match format {
        VideoFormat::TalkingHead => TALKING_HEAD_RULES,
        VideoFormat::Gameplay => GAMEPLAY_RULES,
        VideoFormat::Demo => DEMO_RULES,
        VideoFormat::Other => OTHER_RULES,
    }
}

/// Looks up a built-in rule of a format.
pub fn find_rule(format: VideoFormat, id: &str) -> Option<&'static RuleSpec> {
    rules_for(format).iter().find(|rule| rule.id == id)
}

/// Effective rules for one run after applying per-rule configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    format: VideoFormat,
    rules: Vec<RuleSpec>,
    disabled: Vec<&'static str>,
}

impl RuleSet {
    /// Builds the active rule set of `format`.
    ///
    /// Options keyed by ids that are not part of this format are ignored,
    /// since one config serves every format.
    pub fn for_format(
        format: VideoFormat,
        options: &BTreeMap<String, RuleOption>,
    ) -> Result<Self, LinterError> {
        let mut rules = Vec::new();
        let mut disabled = Vec::new();

        for rule in rules_for(format) {
            let Some(option) = options.get(rule.id) else {
                rules.push(*rule);
                continue;
            };

            if !option.is_enabled() {
                disabled.push(rule.id);
                continue;
            }

            let mut rule = *rule;
            if let Some(severity) = option.severity_override().map_err(|e| {
                LinterError::config(format!("Invalid option for rule '{}': {}", rule.id, e))
            })? {
                rule.severity = severity;
            }
            rules.push(rule);
        }

        Ok(Self {
            format,
            rules,
            disabled,
        })
    }

    /// All catalog rules of `format` with their default settings.
    pub fn defaults(format: VideoFormat) -> Self {
        Self {
            format,
            rules: rules_for(format).to_vec(),
            disabled: Vec::new(),
        }
    }

    pub fn format(&self) -> VideoFormat {
        self.format
    }

    pub fn get(&self, id: &str) -> Option<&RuleSpec> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Returns true if `id` is a catalog rule switched off by configuration.
    pub fn is_disabled(&self, id: &str) -> bool {
        self.disabled.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleSpec> {
        self.rules.iter()
    }

    pub fn rules(&self) -> &[RuleSpec] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
