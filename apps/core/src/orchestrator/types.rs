use crate::config::PromptLengthPolicy;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// User text that passed the length policy. Always stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptText(String);

impl PromptText {
    /// Trims `raw` and checks it against both bounds of `policy`.
    pub fn parse(raw: &str, policy: &PromptLengthPolicy) -> Result<Self, AppError> {
        let text = Self::with_min_length(raw, policy.min_chars)?;
        let chars = text.char_count();
        if chars > policy.max_chars {
            return Err(AppError::Validation(format!(
                "Prompt must be at most {} characters (got {})",
                policy.max_chars, chars
            )));
        }
        Ok(text)
    }

    /// Trims `raw` and checks only the lower bound.
    pub fn with_min_length(raw: &str, min_chars: usize) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        let chars = trimmed.chars().count();
        if chars < min_chars {
            return Err(AppError::Validation(format!(
                "Prompt must be at least {} characters (got {})",
                min_chars, chars
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

/// Opaque token minted once per refinement; only used to correlate ratings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptId(String);

impl PromptId {
    pub fn mint() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The `before/after/why` triple produced by both refinement and enhancement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRewrite {
    pub before: String,
    pub after: String,
    pub why: String,
}
