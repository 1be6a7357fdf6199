//! Pipeline Tests
//!
//! Refinement and enhancement driven end to end against a scripted service.

use super::support::{pipeline, CallKind, ScriptedLlm};
use crate::brain::reflector::DEFAULT_QUESTIONS;
use crate::brain::Category;
use crate::error::AppError;
use crate::orchestrator::enhance::SLOT_PLACEHOLDERS;
use crate::orchestrator::EnhancementInput;
use std::sync::Arc;

// ============================================================================
// Refinement
// ============================================================================

#[tokio::test]
async fn test_refine_marketing_scenario() {
    // 1. Arrange
    let llm = Arc::new(ScriptedLlm::happy());
    let pipeline = pipeline(&llm);

    // 2. Act
    let refinement = pipeline
        .refine("  Write a marketing email for our new product  ", None)
        .await
        .expect("refinement should succeed");

    // 3. Assert
    assert_eq!(refinement.category, Category::Marketing);
    assert_eq!(refinement.rewrite.before, "Write a marketing email for our new product");
    assert_eq!(refinement.rewrite.after, "Section A\n\nSection B");
    assert_eq!(refinement.rewrite.why, "Adds structure");
    assert_eq!(refinement.context_questions.value.0.len(), 3);
    assert!(!refinement.context_questions.used_fallback);
    assert_eq!(refinement.context_questions.value.audience(), "Who will read it?");
    assert_eq!(refinement.language.value, "en");
    assert_eq!(refinement.prompt_id.to_string().len(), 32);

    assert_eq!(
        llm.kinds(),
        vec![CallKind::Detection, CallKind::Refine, CallKind::Reflection]
    );
    let primary = llm.request(CallKind::Refine).unwrap();
    assert!(primary.json_mode);
    assert!(primary.user.starts_with(Category::Marketing.hint()));
    assert!(primary.user.ends_with("Write the final output in this language: en"));
}

#[tokio::test]
async fn test_refine_rejects_out_of_bounds_text_without_calls() {
    let llm = Arc::new(ScriptedLlm::happy());
    let pipeline = pipeline(&llm);

    let too_short = pipeline.refine("   short   ", None).await;
    let too_long = pipeline.refine(&"x".repeat(5001), None).await;

    match too_short {
        Err(AppError::Validation(msg)) => assert!(msg.contains("at least 10")),
        other => panic!("Expected AppError::Validation, got {:?}", other.map(|r| r.rewrite)),
    }
    assert!(matches!(too_long, Err(AppError::Validation(_))));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_refine_length_bounds_are_inclusive() {
    let llm = Arc::new(ScriptedLlm::happy());
    let pipeline = pipeline(&llm);

    assert!(pipeline.refine("0123456789", None).await.is_ok());
    assert!(pipeline.refine(&"y".repeat(5000), None).await.is_ok());
}

#[tokio::test]
async fn test_detection_failure_falls_back_silently() {
    let llm = Arc::new(
        ScriptedLlm::happy().with_detection(Err(AppError::UpstreamTimeout("5s".to_string()))),
    );
    let pipeline = pipeline(&llm);

    let refinement = pipeline
        .refine("Outline a growth strategy for next year", None)
        .await
        .unwrap();

    assert_eq!(refinement.language.value, "en");
    assert!(refinement.language.used_fallback);
    assert_eq!(refinement.category, Category::Business);
    // never retried
    assert_eq!(llm.kinds().iter().filter(|k| **k == CallKind::Detection).count(), 1);
}

#[tokio::test]
async fn test_requested_language_replaces_detection_fallback() {
    let llm = Arc::new(ScriptedLlm::happy().with_detection(Ok("not a code".to_string())));
    let pipeline = pipeline(&llm);

    let refinement = pipeline
        .refine("Escribe un correo para clientes", Some("es"))
        .await
        .unwrap();

    assert_eq!(refinement.language.value, "es");
    let reflection = llm.request(CallKind::Reflection).unwrap();
    assert!(reflection.user.contains("in this language: es"));
}

#[tokio::test]
async fn test_reflection_failure_yields_default_questions() {
    let llm = Arc::new(
        ScriptedLlm::happy().with_reflection(Err(AppError::UpstreamTransport("reset".to_string()))),
    );
    let pipeline = pipeline(&llm);

    let refinement = pipeline
        .refine("Help me teach fractions to kids", None)
        .await
        .unwrap();

    assert!(refinement.context_questions.used_fallback);
    assert_eq!(refinement.context_questions.value.0, DEFAULT_QUESTIONS.map(str::to_string));
    assert_eq!(refinement.rewrite.after, "Section A\n\nSection B");
}

#[tokio::test]
async fn test_primary_failures_propagate() {
    let cases = [
        AppError::UpstreamTimeout("90s".to_string()),
        AppError::UpstreamTransport("503".to_string()),
    ];

    for error in cases {
        let llm = Arc::new(ScriptedLlm::happy().with_primary(Err(error.clone())));
        let pipeline = pipeline(&llm);

        let result = pipeline.refine("Refactor this function to be faster", None).await;

        assert_eq!(
            result.map(|r| r.rewrite).unwrap_err().to_string(),
            error.to_string()
        );
        // reflection only runs after a successful primary call
        assert_eq!(llm.kinds(), vec![CallKind::Detection, CallKind::Refine]);
    }
}

#[tokio::test]
async fn test_malformed_primary_answer_is_format_error() {
    let llm = Arc::new(
        ScriptedLlm::happy().with_primary(Ok(r#"{"before": "b", "after": "", "why": "w"}"#.to_string())),
    );
    let pipeline = pipeline(&llm);

    let result = pipeline.refine("Propose a visual identity for a bakery", None).await;

    assert!(matches!(result, Err(AppError::UpstreamFormat(_))));
}

#[tokio::test]
async fn test_prompt_ids_are_never_reused() {
    let llm = Arc::new(ScriptedLlm::happy());
    let pipeline = pipeline(&llm);

    let first = pipeline.refine("Build a slide outline for the board", None).await.unwrap();
    let second = pipeline.refine("Build a slide outline for the board", None).await.unwrap();

    assert_ne!(first.prompt_id, second.prompt_id);
}

// ============================================================================
// Enhancement
// ============================================================================

fn enhancement(refined: &str) -> EnhancementInput {
    EnhancementInput {
        refined: refined.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_enhance_rejects_short_refined_text_without_calls() {
    let llm = Arc::new(ScriptedLlm::happy());
    let pipeline = pipeline(&llm);

    let result = pipeline.enhance(enhancement("tiny")).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_enhance_substitutes_reflected_questions() {
    // 1. Arrange
    let llm = Arc::new(ScriptedLlm::happy());
    let pipeline = pipeline(&llm);
    let input = EnhancementInput {
        audience: Some("Finance leads".to_string()),
        context_questions: Some(vec![
            "Q-audience".to_string(),
            "Q-outcome".to_string(),
            "Q-constraints".to_string(),
        ]),
        ..enhancement(" Section A\n\nSection B ")
    };

    // 2. Act
    let rewrite = pipeline.enhance(input).await.unwrap();

    // 3. Assert
    assert_eq!(rewrite.before, "Section A\n\nSection B");
    assert_eq!(llm.kinds(), vec![CallKind::Enhance]);

    let request = llm.request(CallKind::Enhance).unwrap();
    assert!(request.user.contains("Audience: Finance leads"));
    assert!(request.user.contains("Desired outcome: Q-outcome"));
    assert!(request.user.contains("Constraints: Q-constraints"));
    assert!(request.user.contains("Improvement notes:\nnone provided"));
    assert!(request.user.ends_with("in this language: en"));
}

#[tokio::test]
async fn test_enhance_ignores_question_lists_of_wrong_length() {
    let llm = Arc::new(ScriptedLlm::happy());
    let pipeline = pipeline(&llm);
    let input = EnhancementInput {
        context_questions: Some(vec!["only one".to_string()]),
        ..enhancement("Section A\n\nSection B")
    };

    pipeline.enhance(input).await.unwrap();

    let request = llm.request(CallKind::Enhance).unwrap();
    assert!(request.user.contains(&format!("Audience: {}", SLOT_PLACEHOLDERS[0])));
    assert!(!request.user.contains("only one"));
}

#[tokio::test]
async fn test_enhance_language_resolution() {
    // explicit non-default language skips detection
    let llm = Arc::new(ScriptedLlm::happy());
    let input = EnhancementInput {
        language: Some("fr".to_string()),
        reference_text: Some("Bonjour tout le monde".to_string()),
        ..enhancement("Section A\n\nSection B")
    };
    pipeline(&llm).enhance(input).await.unwrap();
    assert_eq!(llm.kinds(), vec![CallKind::Enhance]);
    assert!(llm.request(CallKind::Enhance).unwrap().user.ends_with("language: fr"));

    // reference text is detected when no explicit language is given
    let llm = Arc::new(ScriptedLlm::happy().with_detection(Ok("de".to_string())));
    let input = EnhancementInput {
        language: Some("en".to_string()),
        reference_text: Some("Schreibe eine E-Mail".to_string()),
        ..enhancement("Section A\n\nSection B")
    };
    pipeline(&llm).enhance(input).await.unwrap();
    assert_eq!(llm.kinds(), vec![CallKind::Detection, CallKind::Enhance]);
    assert!(llm.request(CallKind::Enhance).unwrap().user.ends_with("language: de"));
}

#[tokio::test]
async fn test_enhance_primary_failure_propagates() {
    let llm = Arc::new(ScriptedLlm::happy().with_primary(Ok("no json here".to_string())));

    let result = pipeline(&llm).enhance(enhancement("Section A\n\nSection B")).await;

    assert!(matches!(result, Err(AppError::UpstreamFormat(_))));
}
