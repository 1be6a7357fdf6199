use super::normalize::parse_rewrite;
use super::types::{PromptId, PromptRewrite, PromptText};
use super::PromptPipeline;
use crate::brain::templates::{refine_user, REFINE_SYSTEM};
use crate::brain::{categorize, detect_language, reflect, BestEffort, Category, ContextQuestions, FALLBACK_LANGUAGE};
use crate::error::AppError;
use crate::llm::CompletionRequest;
use tracing::{info, instrument};

const REFINE_TEMPERATURE: f32 = 0.4;

/// Everything a refinement call hands back to the caller.
#[derive(Debug, Clone)]
pub struct Refinement {
    pub prompt_id: PromptId,
    pub rewrite: PromptRewrite,
    pub category: Category,
    pub context_questions: BestEffort<ContextQuestions>,
    /// Language the rewrite was requested in.
    pub language: BestEffort<String>,
}

impl PromptPipeline {
    /// Turns raw user text into a structured, production-ready prompt.
    ///
    /// 1. Validates the length policy; violations fail before any service call.
    /// 2. Detects the language (best-effort) and categorizes the text.
    /// 3. Issues the primary generation call; its failures fail the request.
    /// 4. Mints a prompt id and reflects follow-up questions (best-effort).
    ///
    /// # Arguments
    ///
    /// * `raw_text` - The user's prompt, untrimmed.
    /// * `requested_language` - Caller's preferred output language; only used when
    ///   detection fell back.
    #[instrument(skip(self, raw_text, requested_language))]
    pub async fn refine(&self, raw_text: &str, requested_language: Option<&str>) -> Result<Refinement, AppError> {
        let text = PromptText::parse(raw_text, &self.policy)?;

        let detected = detect_language(&self.llm, text.as_str(), self.timeouts.language_detection).await;
        let language = resolve_output_language(detected, requested_language);

        let categorization = categorize(text.as_str());
        info!(
            category = %categorization.category,
            language = %language.value,
            chars = text.char_count(),
            "Refining prompt"
        );

        let request = CompletionRequest::new(
            refine_user(categorization.hint, text.as_str(), &language.value),
            self.timeouts.primary,
        )
        .with_system(REFINE_SYSTEM)
        .with_temperature(REFINE_TEMPERATURE)
        .json();

        let raw = self.llm.complete(request).await?;
        let rewrite = parse_rewrite(&raw, text.as_str())?;
        let prompt_id = PromptId::mint();

        let context_questions = reflect(
            &self.llm,
            &rewrite.after,
            &rewrite.why,
            &language.value,
            self.timeouts.context_reflection,
        )
        .await;

        info!(prompt_id = %prompt_id, "Refinement complete");
        Ok(Refinement {
            prompt_id,
            rewrite,
            category: categorization.category,
            context_questions,
            language,
        })
    }
}

/// The detected language wins; a non-default requested language only replaces
/// a fallback.
fn resolve_output_language(detected: BestEffort<String>, requested: Option<&str>) -> BestEffort<String> {
    if !detected.used_fallback {
        return detected;
    }
    match requested
        .map(|l| l.trim().to_ascii_lowercase())
        .filter(|l| !l.is_empty() && l != FALLBACK_LANGUAGE)
    {
        Some(requested) => BestEffort::fallback(requested),
        None => detected,
    }
}
