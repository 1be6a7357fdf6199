//! # Orchestrator
//!
//! Refinement and enhancement pipelines built on the generative service.
//!
//! ## Components
//! - `types`: validated prompt text, prompt identifiers, the rewrite triple
//! - `normalize`: structural validation of the service's JSON answer
//! - `refine`: first-stage transformation of raw user text
//! - `enhance`: second-stage alignment with audience, outcome and constraints

pub mod enhance;
pub mod normalize;
pub mod refine;
pub mod types;

pub use enhance::EnhancementInput;
pub use refine::Refinement;
pub use types::{PromptId, PromptRewrite};

use crate::config::{PromptLengthPolicy, TimeoutBudgets};
use crate::llm::LlmClient;
use std::sync::Arc;

/// Explicit service context shared by every request.
///
/// Constructed once at startup; holds no request-scoped state, so one instance
/// serves concurrent requests.
#[derive(Clone)]
pub struct PromptPipeline {
    llm: Arc<dyn LlmClient>,
    policy: PromptLengthPolicy,
    timeouts: TimeoutBudgets,
}

impl PromptPipeline {
    pub fn new(llm: Arc<dyn LlmClient>, policy: PromptLengthPolicy, timeouts: TimeoutBudgets) -> Self {
        Self {
            llm,
            policy,
            timeouts,
        }
    }
}
