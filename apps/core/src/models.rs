use crate::brain::{Category, ContextQuestions};
use crate::orchestrator::{EnhancementInput, PromptId, PromptRewrite, Refinement};
use crate::ratings::RatingSummary;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /refine`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RefineRequest {
    /// Raw user prompt; length is checked against the configured policy.
    pub text: String,
    /// Preferred output language, used when detection falls back.
    #[serde(default)]
    pub language: Option<String>,
}

/// Body of `POST /enhance`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnhanceRequest {
    pub refined: String,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub constraints: Option<String>,
    #[serde(default, alias = "improvement_notes")]
    pub improvement_notes: Option<String>,
    #[serde(default, alias = "context_questions")]
    pub context_questions: Option<Vec<String>>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, alias = "reference_text")]
    pub reference_text: Option<String>,
}

impl From<EnhanceRequest> for EnhancementInput {
    fn from(req: EnhanceRequest) -> Self {
        Self {
            refined: req.refined,
            audience: req.audience,
            outcome: req.outcome,
            constraints: req.constraints,
            improvement_notes: req.improvement_notes,
            context_questions: req.context_questions,
            language: req.language,
            reference_text: req.reference_text,
        }
    }
}

/// Body of `POST /feedback`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeedbackRequest {
    #[serde(alias = "prompt_id")]
    #[validate(length(min = 1, max = 128))]
    pub prompt_id: String,
    /// Star rating; fractional values are rejected at deserialization.
    #[validate(range(min = 1, max = 5))]
    pub rating: i64,
}

/// Query of `GET /feedback/avg`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AvgQuery {
    #[serde(alias = "prompt_id")]
    #[validate(length(min = 1, max = 128))]
    pub prompt_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineResponse {
    pub prompt_id: PromptId,
    pub before: String,
    pub after: String,
    pub why: String,
    pub category: Category,
    pub context_questions: ContextQuestions,
    pub detected_language: String,
}

impl From<Refinement> for RefineResponse {
    fn from(refinement: Refinement) -> Self {
        let PromptRewrite { before, after, why } = refinement.rewrite;
        Self {
            prompt_id: refinement.prompt_id,
            before,
            after,
            why,
            category: refinement.category,
            context_questions: refinement.context_questions.into_inner(),
            detected_language: refinement.language.into_inner(),
        }
    }
}

/// `POST /enhance` answers with the bare rewrite triple.
pub type EnhanceResponse = PromptRewrite;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub success: bool,
    pub global_average: f64,
    pub global_total: i64,
}

impl From<RatingSummary> for FeedbackResponse {
    fn from(global: RatingSummary) -> Self {
        Self {
            success: true,
            global_average: global.average,
            global_total: global.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AvgResponse {
    pub avg: f64,
    pub count: i64,
}

impl From<RatingSummary> for AvgResponse {
    fn from(summary: RatingSummary) -> Self {
        Self {
            avg: summary.average,
            count: summary.count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalAvgResponse {
    pub avg: f64,
    pub total_ratings: i64,
}

impl From<RatingSummary> for GlobalAvgResponse {
    fn from(summary: RatingSummary) -> Self {
        Self {
            avg: summary.average,
            total_ratings: summary.count,
        }
    }
}

/// Static service metadata served at `/`.
#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub redis: &'static str,
    pub timestamp: String,
}
