//! Language detection through the generative service.
//!
//! Best-effort: any failure (transport, timeout, unusable answer) yields
//! `FALLBACK_LANGUAGE`. Never retried, never surfaced.

use super::templates::LANGUAGE_DETECTION_SYSTEM;
use super::BestEffort;
use crate::llm::{CompletionRequest, LlmClient};
use std::time::Duration;
use tracing::warn;

pub const FALLBACK_LANGUAGE: &str = "en";

/// Classifies the dominant language of `text` as an ISO 639-1 code.
pub async fn detect_language<L>(llm: &L, text: &str, budget: Duration) -> BestEffort<String>
where
    L: LlmClient + ?Sized,
{
    let request = CompletionRequest::new(text, budget)
        .with_system(LANGUAGE_DETECTION_SYSTEM)
        .with_temperature(0.0);

    match llm.complete(request).await {
        Ok(raw) => match normalize_code(&raw) {
            Some(code) => BestEffort::derived(code),
            None => {
                warn!("Language detection returned an unusable code: {:?}", raw);
                BestEffort::fallback(FALLBACK_LANGUAGE.to_string())
            }
        },
        Err(e) => {
            warn!("Language detection failed: {}", e);
            BestEffort::fallback(FALLBACK_LANGUAGE.to_string())
        }
    }
}

/// Accepts answers like `en`, ` "ES". ` or `'no'`; rejects anything that is not
/// two ASCII letters once quotes and punctuation are stripped.
fn normalize_code(raw: &str) -> Option<String> {
    let code = raw
        .trim()
        .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_ascii_lowercase();

    (code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase())).then_some(code)
}
