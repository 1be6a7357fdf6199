//! # Brain Module
//!
//! Analysis steps that surround the primary generation calls.
//!
//! ## Components
//! - `category`: keyword categorization (pure, no I/O)
//! - `language`: language detection via the generative service (best-effort)
//! - `reflector`: follow-up context questions via the generative service (best-effort)
//! - `templates`: every instruction text sent to the service

pub mod category;
pub mod language;
pub mod reflector;
pub mod templates;

pub use category::{categorize, Category};
pub use language::{detect_language, FALLBACK_LANGUAGE};
pub use reflector::{reflect, ContextQuestions};

/// Outcome of a best-effort step: always a usable value, plus whether it is the
/// documented fallback rather than a service-derived one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestEffort<T> {
    pub value: T,
    pub used_fallback: bool,
}

impl<T> BestEffort<T> {
    pub fn derived(value: T) -> Self {
        Self {
            value,
            used_fallback: false,
        }
    }

    pub fn fallback(value: T) -> Self {
        Self {
            value,
            used_fallback: true,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}
