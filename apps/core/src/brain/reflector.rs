//! Context reflection: three follow-up questions (audience, outcome,
//! constraints) derived from a refined prompt.
//!
//! Best-effort like language detection; any failure yields the default triple.

use super::templates::reflection_prompt;
use super::BestEffort;
use crate::llm::{CompletionRequest, LlmClient};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_QUESTIONS: [&str; 3] = ["Who is this for?", "What is the purpose?", "Any constraints?"];

/// Exactly three questions, ordered audience, outcome, constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextQuestions(pub [String; 3]);

impl ContextQuestions {
    pub fn defaults() -> Self {
        Self(DEFAULT_QUESTIONS.map(str::to_string))
    }

    /// Accepts a caller-supplied list only when it holds exactly three entries.
    pub fn from_slice(questions: &[String]) -> Option<Self> {
        match questions {
            [audience, outcome, constraints] => Some(Self([
                audience.clone(),
                outcome.clone(),
                constraints.clone(),
            ])),
            _ => None,
        }
    }

    pub fn audience(&self) -> &str {
        &self.0[0]
    }

    pub fn outcome(&self) -> &str {
        &self.0[1]
    }

    pub fn constraints(&self) -> &str {
        &self.0[2]
    }
}

/// Asks the service for follow-up questions about `refined` in `language`.
pub async fn reflect<L>(
    llm: &L,
    refined: &str,
    why: &str,
    language: &str,
    budget: Duration,
) -> BestEffort<ContextQuestions>
where
    L: LlmClient + ?Sized,
{
    let request = CompletionRequest::new(reflection_prompt(refined, why, language), budget)
        .with_temperature(0.6)
        .json();

    let raw = match llm.complete(request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Context reflection failed: {}", e);
            return BestEffort::fallback(ContextQuestions::defaults());
        }
    };

    match parse_questions(&raw) {
        Some(questions) => BestEffort::derived(questions),
        None => {
            warn!("Context reflection returned an unusable payload");
            BestEffort::fallback(ContextQuestions::defaults())
        }
    }
}

fn parse_questions(raw: &str) -> Option<ContextQuestions> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let entries = value.get("questions")?.as_array()?;
    if entries.len() != 3 {
        return None;
    }

    let questions = entries
        .iter()
        .map(|q| q.as_str().map(str::trim).filter(|q| !q.is_empty()).map(str::to_string))
        .collect::<Option<Vec<String>>>()?;

    ContextQuestions::from_slice(&questions)
}
