//! Shared fixtures: a scripted generative service and pipeline builders.

use crate::brain::templates::{ENHANCE_SYSTEM, LANGUAGE_DETECTION_SYSTEM, REFINE_SYSTEM};
use crate::config::{PromptLengthPolicy, TimeoutBudgets};
use crate::error::AppError;
use crate::llm::{CompletionRequest, LlmClient};
use crate::orchestrator::PromptPipeline;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub const REWRITE_JSON: &str =
    r#"{"before": "whatever the model echoed", "after": "Section A\n\nSection B", "why": "Adds structure"}"#;
pub const QUESTIONS_JSON: &str =
    r#"{"questions": ["Who will read it?", "What should they do?", "How long may it be?"]}"#;

/// Which call site a request came from, recovered from its system instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Detection,
    Refine,
    Enhance,
    Reflection,
}

fn classify(request: &CompletionRequest) -> CallKind {
    match request.system.as_deref() {
        Some(LANGUAGE_DETECTION_SYSTEM) => CallKind::Detection,
        Some(REFINE_SYSTEM) => CallKind::Refine,
        Some(ENHANCE_SYSTEM) => CallKind::Enhance,
        _ => CallKind::Reflection,
    }
}

/// Answers each call site with a fixed result and records every request.
pub struct ScriptedLlm {
    pub detection: Result<String, AppError>,
    pub primary: Result<String, AppError>,
    pub reflection: Result<String, AppError>,
    calls: Mutex<Vec<(CallKind, CompletionRequest)>>,
}

impl ScriptedLlm {
    /// Every call succeeds: English, a two-section rewrite, three questions.
    pub fn happy() -> Self {
        Self {
            detection: Ok("en".to_string()),
            primary: Ok(REWRITE_JSON.to_string()),
            reflection: Ok(QUESTIONS_JSON.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_detection(mut self, result: Result<String, AppError>) -> Self {
        self.detection = result;
        self
    }

    pub fn with_primary(mut self, result: Result<String, AppError>) -> Self {
        self.primary = result;
        self
    }

    pub fn with_reflection(mut self, result: Result<String, AppError>) -> Self {
        self.reflection = result;
        self
    }

    pub fn kinds(&self) -> Vec<CallKind> {
        self.calls.lock().unwrap().iter().map(|(kind, _)| *kind).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The recorded request of the first call of `kind`.
    pub fn request(&self, kind: CallKind) -> Option<CompletionRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, request)| request.clone())
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
        let kind = classify(&request);
        self.calls.lock().unwrap().push((kind, request));
        match kind {
            CallKind::Detection => self.detection.clone(),
            CallKind::Refine | CallKind::Enhance => self.primary.clone(),
            CallKind::Reflection => self.reflection.clone(),
        }
    }
}

/// A pipeline over `llm` with the default policy and budgets.
pub fn pipeline(llm: &Arc<ScriptedLlm>) -> PromptPipeline {
    let client: Arc<dyn LlmClient> = llm.clone();
    PromptPipeline::new(client, PromptLengthPolicy::default(), TimeoutBudgets::default())
}
