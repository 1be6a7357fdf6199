//! # Generative Service
//!
//! The external text-completion capability the pipeline delegates reasoning to.
//!
//! ## Components
//! - `traits`: the `LlmClient` seam and its request type
//! - `openai`: OpenAI-compatible HTTP implementation

pub mod openai;
pub mod traits;

pub use openai::OpenAiClient;
pub use traits::{CompletionRequest, LlmClient};
