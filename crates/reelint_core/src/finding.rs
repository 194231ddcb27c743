//! Validation of raw analyzer findings.

use tracing::warn;

use crate::analyzer::RawFinding;
use crate::catalog::RuleSet;
use crate::error::FindingError;
use crate::format::Category;
use crate::issue_key::IssueKey;
use crate::preferences::PreferenceMap;
use crate::result::Violation;
use crate::severity::{Severity, resolve_effective_severity};

/// Turns one raw finding into a violation.
///
/// Findings for active catalog rules take severity and category from the
/// catalog; the analyzer's suggestions only apply to findings without one.
/// A suggested severity must still be one of the four levels.
pub fn normalize_finding(
    raw: &RawFinding,
    rules: &RuleSet,
    preferences: &PreferenceMap,
) -> Result<Violation, FindingError> {
    let rule_id = non_blank(raw.rule_id.as_deref());

    if let Some(id) = rule_id
        && rules.is_disabled(id)
    {
        return Err(FindingError::DisabledRule(id.to_string()));
    }

    let rule = rule_id.and_then(|id| rules.get(id));
    if let (Some(id), None) = (rule_id, rule) {
        warn!(
            "Finding references rule '{}' which is not active for {}; keeping it as reported",
            id,
            rules.format()
        );
    }

    let message = non_blank(raw.message.as_deref())
        .ok_or(FindingError::MissingMessage)?
        .to_string();

    let suggested = non_blank(raw.severity.as_deref())
        .map(|s| {
            s.to_ascii_lowercase()
                .parse::<Severity>()
                .map_err(|_| FindingError::UnknownSeverity(s.to_string()))
        })
        .transpose()?;

    let original_severity = match (rule, suggested) {
        (Some(rule), _) => rule.severity,
        (None, Some(severity)) => severity,
        (None, None) => return Err(FindingError::MissingSeverity(message)),
    };

    let category = match rule {
        Some(rule) => rule.category,
        None => non_blank(raw.category.as_deref())
            .and_then(Category::parse)
            .ok_or_else(|| FindingError::UnknownCategory(raw.category.clone()))?,
    };

    let issue_key = IssueKey::derive(rule_id, &message);
    let severity = resolve_effective_severity(original_severity, preferences.get(&issue_key));

    Ok(Violation {
        rule_id: rule_id.map(str::to_string),
        issue_key,
        message,
        evidence: non_blank(raw.evidence.as_deref())
            .unwrap_or_default()
            .to_string(),
        severity,
        original_severity,
        category,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::VideoFormat;
    use crate::preferences::UserIssuePreference;
    use pretty_assertions::assert_eq;

    fn talking_head() -> RuleSet {
        RuleSet::defaults(VideoFormat::TalkingHead)
    }

    #[test]
    fn test_rule_finding_uses_catalog() {
        let raw = RawFinding::rule("weak_hook")
            .with_message("Opens with a logo sting")
            .with_evidence("0:00-0:03")
            .with_category("value");

        let v = normalize_finding(&raw, &talking_head(), &PreferenceMap::new()).unwrap();

        assert_eq!(v.rule_id.as_deref(), Some("weak_hook"));
        assert_eq!(v.issue_key.as_str(), "weak_hook");
        assert_eq!(v.message, "Opens with a logo sting");
        assert_eq!(v.evidence, "0:00-0:03");
        assert_eq!(v.severity, Severity::Critical);
        assert_eq!(v.original_severity, Severity::Critical);
        assert_eq!(v.category, Category::HookStrength);
    }

    #[test]
    fn test_rule_finding_without_message_is_dropped() {
        let blank = RawFinding::rule("dead_air").with_message("  ");
        for raw in [RawFinding::rule("dead_air"), blank] {
            assert_eq!(
                normalize_finding(&raw, &talking_head(), &PreferenceMap::new()),
                Err(FindingError::MissingMessage)
            );
        }
    }

    #[test]
    fn test_catalog_severity_wins_over_suggestion() {
        let raw = RawFinding::rule("weak_hook")
            .with_message("Logo intro")
            .with_severity("minor");

        let v = normalize_finding(&raw, &talking_head(), &PreferenceMap::new()).unwrap();

        assert_eq!(v.severity, Severity::Critical);
        assert_eq!(v.original_severity, Severity::Critical);
        assert_eq!(v.category, Category::HookStrength);
    }

    #[test]
    fn test_ignored_suggestion_is_kept() {
        let raw = RawFinding::message("Brief lens flare")
            .with_severity("ignored")
            .with_category("delivery");

        let v = normalize_finding(&raw, &talking_head(), &PreferenceMap::new()).unwrap();

        assert_eq!(v.severity, Severity::Ignored);
        assert_eq!(v.severity.points(), 0);

        let rule = RawFinding::rule("dead_air")
            .with_message("Pause at 0:12")
            .with_severity("ignored");
        let v = normalize_finding(&rule, &talking_head(), &PreferenceMap::new()).unwrap();
        assert_eq!(v.severity, Severity::Minor);
    }

    #[test]
    fn test_ai_finding() {
        let raw = RawFinding::message("  Hook is too slow ")
            .with_severity("Moderate")
            .with_category("hook");

        let v = normalize_finding(&raw, &talking_head(), &PreferenceMap::new()).unwrap();

        assert_eq!(v.rule_id, None);
        assert_eq!(v.issue_key.as_str(), "ai_k0fh1i");
        assert_eq!(v.message, "Hook is too slow");
        assert_eq!(v.severity, Severity::Moderate);
        assert_eq!(v.category, Category::HookStrength);
    }

    #[test]
    fn test_preference_overrides_severity() {
        let mut prefs = PreferenceMap::new();
        prefs.insert(
            IssueKey::from("weak_hook"),
            UserIssuePreference {
                severity: Severity::Ignored,
                original_severity: Severity::Critical,
            },
        );

        let raw = RawFinding::rule("weak_hook").with_message("Logo intro");
        let v = normalize_finding(&raw, &talking_head(), &prefs).unwrap();

        assert_eq!(v.severity, Severity::Ignored);
        assert_eq!(v.original_severity, Severity::Critical);
        assert!(v.is_overridden());
    }

    #[test]
    fn test_missing_message_without_rule_is_dropped() {
        let raw = RawFinding::message("   ")
            .with_severity("minor")
            .with_category("hook");
        assert_eq!(
            normalize_finding(&raw, &talking_head(), &PreferenceMap::new()),
            Err(FindingError::MissingMessage)
        );
    }

    #[test]
    fn test_unknown_severity_is_dropped() {
        let raw = RawFinding::rule("weak_hook")
            .with_message("Logo intro")
            .with_severity("catastrophic");
        assert_eq!(
            normalize_finding(&raw, &talking_head(), &PreferenceMap::new()),
            Err(FindingError::UnknownSeverity("catastrophic".to_string()))
        );
    }

    #[test]
    fn test_ai_finding_needs_severity_and_category() {
        let no_severity = RawFinding::message("Lighting flickers").with_category("delivery");
        assert_eq!(
            normalize_finding(&no_severity, &talking_head(), &PreferenceMap::new()),
            Err(FindingError::MissingSeverity("Lighting flickers".to_string()))
        );

        let bad_category = RawFinding::message("Lighting flickers")
            .with_severity("minor")
            .with_category("lighting");
        assert_eq!(
            normalize_finding(&bad_category, &talking_head(), &PreferenceMap::new()),
            Err(FindingError::UnknownCategory(Some("lighting".to_string())))
        );
    }

    #[test]
    fn test_disabled_rule_is_dropped() {
        let mut options = std::collections::BTreeMap::new();
        options.insert(
            "dead_air".to_string(),
            crate::config::RuleOption::Enabled(false),
        );
        let rules = RuleSet::for_format(VideoFormat::TalkingHead, &options).unwrap();

        assert_eq!(
            normalize_finding(
                &RawFinding::rule("dead_air").with_message("Pause at 0:12"),
                &rules,
                &PreferenceMap::new()
            ),
            Err(FindingError::DisabledRule("dead_air".to_string()))
        );
    }

    #[test]
    fn test_foreign_rule_id_is_kept_verbatim() {
        let raw = RawFinding::rule("hud_clutter")
            .with_message("Overlay covers the minimap")
            .with_severity("minor")
            .with_category("delivery_performance");

        let v = normalize_finding(&raw, &talking_head(), &PreferenceMap::new()).unwrap();

        assert_eq!(v.issue_key.as_str(), "hud_clutter");
        assert_eq!(v.category, Category::DeliveryPerformance);
        assert_eq!(v.severity, Severity::Minor);
    }
}
