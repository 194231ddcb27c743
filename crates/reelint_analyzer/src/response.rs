//! Parsing of Gemini responses.

use reelint_core::{RawFinding, VideoFormat};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::GeminiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    pub(crate) fn into_text(self) -> Result<String, GeminiError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GeminiError::Blocked(reason));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GeminiError::invalid_response("response has no candidates"))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
            return Err(GeminiError::invalid_response(format!(
                "candidate has no text (finish reason: {})",
                reason
            )));
        }

        Ok(text)
    }
}

/// Removes a surrounding Markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parses the findings list out of model output.
///
/// Accepts a bare array or an object with a `findings` array. Items that are
/// not objects become empty findings so the linter counts them as dropped.
pub fn parse_findings(text: &str) -> Result<Vec<RawFinding>, GeminiError> {
    let body = strip_code_fence(text);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| GeminiError::invalid_response(format!("findings are not JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("findings") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) => Vec::new(),
            _ => {
                return Err(GeminiError::invalid_response(
                    "expected a \"findings\" array",
                ));
            }
        },
        other => {
            return Err(GeminiError::invalid_response(format!(
                "expected an array of findings, got {}",
                json_kind(&other)
            )));
        }
    };

    Ok(items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<RawFinding>(item).unwrap_or_else(|e| {
                warn!("Unreadable finding in response: {}", e);
                RawFinding::default()
            })
        })
        .collect())
}

/// Parses the classification answer.
pub fn parse_format(text: &str) -> Result<VideoFormat, GeminiError> {
    let body = strip_code_fence(text);
    let value: Value = serde_json::from_str(body)
        .unwrap_or_else(|_| Value::String(body.trim_matches('"').to_string()));

    let name = match &value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map
            .get("format")
            .and_then(Value::as_str)
            .ok_or_else(|| GeminiError::invalid_response("expected a \"format\" string"))?,
        other => {
            return Err(GeminiError::invalid_response(format!(
                "expected a format, got {}",
                json_kind(other)
            )));
        }
    };

    name.trim()
        .to_ascii_lowercase()
        .replace(['-', ' '], "_")
        .parse()
        .map_err(|_| GeminiError::invalid_response(format!("unknown format {:?}", name)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("[]", "[]")]
    #[case("```json\n[1]\n```", "[1]")]
    #[case("```\n{\"a\": 1}\n```\n", "{\"a\": 1}")]
    #[case("  {\"a\": 1}  ", "{\"a\": 1}")]
    fn test_strip_code_fence(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_code_fence(input), expected);
    }

    #[test]
    fn test_parse_findings_object() {
        let text = r#"{"findings": [
            {"rule_id": "weak_hook", "message": "Slow open", "evidence": "0:00-0:04", "severity": "critical", "category": "hook_strength"},
            {"rule_id": null, "message": "Music too loud", "severity": "moderate", "category": "delivery_performance"}
        ]}"#;

        let findings = parse_findings(text).unwrap();

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].rule_id.as_deref(), Some("weak_hook"));
        assert_eq!(findings[0].evidence.as_deref(), Some("0:00-0:04"));
        assert_eq!(findings[1].rule_id, None);
        assert_eq!(findings[1].message.as_deref(), Some("Music too loud"));
    }

    #[test]
    fn test_parse_findings_fenced_array_with_junk_item() {
        let text = "```json\n[{\"ruleId\": \"dead_air\"}, \"oops\"]\n```";

        let findings = parse_findings(text).unwrap();

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].rule_id.as_deref(), Some("dead_air"));
        assert_eq!(findings[1], RawFinding::default());
    }

    #[rstest]
    #[case("not json")]
    #[case("42")]
    #[case("{\"results\": []}")]
    fn test_parse_findings_rejects(#[case] text: &str) {
        assert!(matches!(
            parse_findings(text),
            Err(GeminiError::InvalidResponse(_))
        ));
    }

    #[rstest]
    #[case("{\"format\": \"gameplay\"}", VideoFormat::Gameplay)]
    #[case("```json\n{\"format\": \"Talking Head\"}\n```", VideoFormat::TalkingHead)]
    #[case("\"demo\"", VideoFormat::Demo)]
    #[case("other", VideoFormat::Other)]
    fn test_parse_format(#[case] text: &str, #[case] expected: VideoFormat) {
        assert_eq!(parse_format(text).unwrap(), expected);
    }

    #[test]
    fn test_parse_format_unknown() {
        assert!(parse_format("{\"format\": \"vlog\"}").is_err());
        assert!(parse_format("{\"kind\": \"demo\"}").is_err());
    }

    #[test]
    fn test_into_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "[{\"rule"}, {"text": "_id\": \"x\"}]"}]}}]}"#,
        )
        .unwrap();

        assert_eq!(response.into_text().unwrap(), r#"[{"rule_id": "x"}]"#);
    }

    #[test]
    fn test_into_text_blocked() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();

        assert!(matches!(response.into_text(), Err(GeminiError::Blocked(r)) if r == "SAFETY"));
    }

    #[test]
    fn test_into_text_empty_candidate() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#).unwrap();

        let err = response.into_text().unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }
}
