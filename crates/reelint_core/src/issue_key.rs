//! Stable identifiers joining violations to user preferences.
//!
//! Rule-based issues are keyed by their rule id. Free-form issues found by
//! the analyzer are keyed by a 32-bit rolling hash of the normalized message,
//! computed exactly as the web client did so previously stored keys keep
//! matching.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::result::Violation;

/// Prefix of keys derived from free-form messages.
pub const AI_KEY_PREFIX: &str = "ai_";

/// Identifier of an issue type, independent of any single video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueKey(String);

impl IssueKey {
    /// Derives the key for an issue.
    ///
    /// A non-empty `rule_id` is returned unchanged; otherwise the key is
    /// hashed from `message`.
    pub fn derive(rule_id: Option<&str>, message: &str) -> Self {
        match rule_id {
            Some(id) if !id.is_empty() => Self(id.to_string()),
            _ => Self::from_message(message),
        }
    }

    /// Recomputes the key of an existing violation from its rule id and message.
    pub fn for_violation(violation: &Violation) -> Self {
        Self::derive(violation.rule_id.as_deref(), &violation.message)
    }

    /// Derives the `ai_` key for a free-form message.
    pub fn from_message(message: &str) -> Self {
        let normalized = message.trim().to_lowercase();
        let hash = rolling_hash(&normalized);
        Self(format!(
            "{}{}",
            AI_KEY_PREFIX,
            to_base36(i64::from(hash).unsigned_abs())
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the key was hashed from a message.
    pub fn is_ai_discovered(&self) -> bool {
        self.0.starts_with(AI_KEY_PREFIX)
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for IssueKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for IssueKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for IssueKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for IssueKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Shorthand for [`IssueKey::derive`].
pub fn issue_key(rule_id: Option<&str>, message: &str) -> IssueKey {
    IssueKey::derive(rule_id, message)
}

/// `hash = hash * 31 + unit` over UTF-16 code units with `i32` wraparound.
fn rolling_hash(text: &str) -> i32 {
    text.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut buf = Vec::with_capacity(13);
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    // Only ASCII digits were pushed.
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::sentence("Hook is too slow", "ai_k0fh1i")]
    #[case::single_char("a", "ai_2p")]
    #[case::empty("", "ai_0")]
    #[case::longer("Background music drowns out the voice", "ai_kbrlgn")]
    #[case::overlay("Text overlay is unreadable on mobile", "ai_1qg0wv")]
    #[case::non_bmp("café ☕ 🎮", "ai_snsnzw")]
    fn test_matches_historical_keys(#[case] message: &str, #[case] expected: &str) {
        assert_eq!(IssueKey::from_message(message).as_str(), expected);
    }

    #[test]
    fn test_normalizes_case_and_whitespace() {
        assert_eq!(
            IssueKey::from_message("  HOOK IS TOO SLOW \n"),
            IssueKey::from_message("hook is too slow")
        );
    }

    #[test]
    fn test_rule_id_wins() {
        let key = issue_key(Some("weak_hook"), "anything at all");
        assert_eq!(key.as_str(), "weak_hook");
        assert!(!key.is_ai_discovered());
    }

    #[test]
    fn test_empty_rule_id_falls_back_to_message() {
        let key = issue_key(Some(""), "Hook is too slow");
        assert_eq!(key.as_str(), "ai_k0fh1i");
        assert!(key.is_ai_discovered());
    }

    #[test]
    fn test_for_violation_matches_stored_key() {
        use crate::format::Category;
        use crate::severity::Severity;

        let mut violation = Violation {
            rule_id: None,
            issue_key: IssueKey::from("ai_k0fh1i"),
            message: "Hook is too slow".to_string(),
            evidence: String::new(),
            severity: Severity::Moderate,
            original_severity: Severity::Moderate,
            category: Category::HookStrength,
        };
        assert_eq!(IssueKey::for_violation(&violation), violation.issue_key);

        violation.rule_id = Some("weak_hook".to_string());
        assert_eq!(IssueKey::for_violation(&violation).as_str(), "weak_hook");
    }

    #[test]
    fn test_different_messages_differ() {
        assert_ne!(
            IssueKey::from_message("Captions are missing"),
            IssueKey::from_message("Captions are too small")
        );
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(2_147_483_648), "zik0zk");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let key = IssueKey::from("weak_hook");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"weak_hook\"");
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_key_is_stable_under_normalization(message in "[ -~]{0,64}") {
            let padded = format!("  {}\t", message.to_uppercase());
            prop_assert_eq!(IssueKey::from_message(&message), IssueKey::from_message(&padded));
        }

        #[test]
        fn test_rule_keys_are_verbatim(rule_id in "[a-z_]{1,32}", message in ".*") {
            let key = issue_key(Some(&rule_id), &message);
            prop_assert_eq!(key.as_str(), rule_id.as_str());
        }

        #[test]
        fn test_ai_keys_are_base36(message in ".*") {
            let key = IssueKey::from_message(&message);
            let body = key.as_str().strip_prefix(AI_KEY_PREFIX).unwrap();
            prop_assert!(!body.is_empty());
            prop_assert!(body.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        }
    }
}
