use crate::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A single completion call: one optional system instruction, one user instruction.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub user: String,
    pub temperature: f32,
    /// Ask the service for a JSON object instead of free text.
    pub json_mode: bool,
    /// Budget for this call alone; elapsed budgets surface as `UpstreamTimeout`.
    pub timeout: Duration,
}

impl CompletionRequest {
    pub fn new(user: impl Into<String>, timeout: Duration) -> Self {
        Self {
            system: None,
            user: user.into(),
            temperature: 0.0,
            json_mode: false,
            timeout,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// Defines the public interface for the generative text service.
///
/// This trait abstracts the concrete backend so that orchestrators can be exercised
/// against scripted fakes in tests.
#[async_trait]
pub trait LlmClient: Send + Sync + 'static {
    /// Returns the raw text content of the first completion choice.
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError>;
}

#[async_trait]
impl LlmClient for Arc<dyn LlmClient> {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
        (**self).complete(request).await
    }
}
