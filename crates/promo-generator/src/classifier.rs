//! Classification of upstream generation failures.
//!
//! The backend reports refusals in several shapes: a JSON array of
//! `{type, msg}` objects, a bare string, or arbitrary text from an
//! intermediate layer. Classification never fails; anything unrecognized is
//! [`ErrorKind::Unknown`].

use serde::Serialize;
use serde_json::Value;

/// `type` value the backend uses for moderation refusals.
pub const CONTENT_POLICY_TYPE: &str = "content_policy_violation";

/// Lower-case phrases that mark a moderation refusal in free text.
pub const POLICY_KEYWORDS: &[&str] = &[
    "content policy",
    "policy violation",
    "nsfw",
    "not safe for work",
    "inappropriate content",
    "safety filter",
    "safety system",
    CONTENT_POLICY_TYPE,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ContentPolicyViolation,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ContentPolicyViolation => "content_policy_violation",
            ErrorKind::Unknown => "unknown",
        }
    }
}

/// An upstream failure reduced to a kind and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    pub raw: String,
}

impl ClassifiedError {
    /// Only moderation refusals are worth another attempt with the same input.
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::ContentPolicyViolation
    }

    pub fn is_content_policy(&self) -> bool {
        self.kind == ErrorKind::ContentPolicyViolation
    }
}

/// Classify raw upstream error text.
pub fn classify(raw: &str) -> ClassifiedError {
    if let Some((error_type, msg)) = first_structured_entry(raw) {
        let kind = if error_type == CONTENT_POLICY_TYPE
            || contains_policy_keyword(&error_type)
            || contains_policy_keyword(&msg)
        {
            ErrorKind::ContentPolicyViolation
        } else {
            ErrorKind::Unknown
        };
        let message = if msg.is_empty() { raw.to_string() } else { msg };
        return ClassifiedError {
            kind,
            message,
            raw: raw.to_string(),
        };
    }

    let kind = if contains_policy_keyword(raw) {
        ErrorKind::ContentPolicyViolation
    } else {
        ErrorKind::Unknown
    };

    ClassifiedError {
        kind,
        message: raw.to_string(),
        raw: raw.to_string(),
    }
}

/// `type` and `msg` of the first element of a JSON array, if `raw` is one.
fn first_structured_entry(raw: &str) -> Option<(String, String)> {
    let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(raw.trim()) else {
        return None;
    };
    let first = entries.first()?;

    let field = |name: &str| {
        first
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Some((field("type"), field("msg")))
}

fn contains_policy_keyword(text: &str) -> bool {
    let lowered = text.to_lowercase();
    POLICY_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}
