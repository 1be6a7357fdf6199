use super::normalize::parse_rewrite;
use super::types::{PromptRewrite, PromptText};
use super::PromptPipeline;
use crate::brain::templates::{enhance_user, EnhanceSlots, ENHANCE_SYSTEM};
use crate::brain::{detect_language, ContextQuestions, FALLBACK_LANGUAGE};
use crate::error::AppError;
use crate::llm::CompletionRequest;
use tracing::{info, instrument};

const ENHANCE_TEMPERATURE: f32 = 0.55;

/// Framing questions for slots the caller left empty and no reflected question covers.
pub const SLOT_PLACEHOLDERS: [&str; 3] = [
    "Who is this for?",
    "What should this achieve?",
    "Any tone or format constraints?",
];

/// Caller-supplied context for a second-stage enhancement.
#[derive(Debug, Clone, Default)]
pub struct EnhancementInput {
    pub refined: String,
    pub audience: Option<String>,
    pub outcome: Option<String>,
    pub constraints: Option<String>,
    pub improvement_notes: Option<String>,
    /// Questions returned by the originating refinement, used only as a triple.
    pub context_questions: Option<Vec<String>>,
    pub language: Option<String>,
    /// Text to detect the language from when no explicit language is given.
    pub reference_text: Option<String>,
}

impl PromptPipeline {
    /// Aligns an already-refined prompt with audience, outcome and constraints.
    ///
    /// No prompt id is minted; ratings stay attached to the originating refinement.
    #[instrument(skip(self, input))]
    pub async fn enhance(&self, input: EnhancementInput) -> Result<PromptRewrite, AppError> {
        let refined = PromptText::with_min_length(&input.refined, self.policy.min_chars)?;

        let questions = input
            .context_questions
            .as_deref()
            .and_then(ContextQuestions::from_slice);
        let [audience, outcome, constraints] = fill_slots(
            [&input.audience, &input.outcome, &input.constraints],
            questions.as_ref(),
        );

        let language = self
            .resolve_language(input.language.as_deref(), input.reference_text.as_deref())
            .await;
        info!(language = %language, chars = refined.char_count(), "Enhancing prompt");

        let user = enhance_user(&EnhanceSlots {
            refined: refined.as_str(),
            improvement_notes: input.improvement_notes.as_deref().unwrap_or_default(),
            audience: &audience,
            outcome: &outcome,
            constraints: &constraints,
            language: &language,
        });
        let request = CompletionRequest::new(user, self.timeouts.primary)
            .with_system(ENHANCE_SYSTEM)
            .with_temperature(ENHANCE_TEMPERATURE)
            .json();

        let raw = self.llm.complete(request).await?;
        parse_rewrite(&raw, refined.as_str())
    }

    /// Explicit non-default language, else the reference text's language, else `en`.
    async fn resolve_language(&self, requested: Option<&str>, reference: Option<&str>) -> String {
        if let Some(language) = requested
            .map(|l| l.trim().to_ascii_lowercase())
            .filter(|l| !l.is_empty() && l != FALLBACK_LANGUAGE)
        {
            return language;
        }
        match reference.filter(|t| !t.trim().is_empty()) {
            Some(text) => detect_language(&self.llm, text, self.timeouts.language_detection)
                .await
                .into_inner(),
            None => FALLBACK_LANGUAGE.to_string(),
        }
    }
}

/// Empty slots get the positional reflected question, or the slot's placeholder.
fn fill_slots(given: [&Option<String>; 3], questions: Option<&ContextQuestions>) -> [String; 3] {
    std::array::from_fn(|index| {
        match given[index].as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => v.to_string(),
            None => questions
                .map(|q| [q.audience(), q.outcome(), q.constraints()][index].to_string())
                .unwrap_or_else(|| SLOT_PLACEHOLDERS[index].to_string()),
        }
    })
}
