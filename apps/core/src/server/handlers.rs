use super::AppState;
use crate::error::AppError;
use crate::models::{
    AvgQuery, AvgResponse, EnhanceRequest, EnhanceResponse, FeedbackRequest, FeedbackResponse,
    GlobalAvgResponse, HealthResponse, RefineRequest, RefineResponse, RootResponse,
};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    code: String,
    message: String,
}

type HandlerError = (StatusCode, Json<ErrorBody>);

/// Validation errors keep their message; anything else is logged and replaced
/// by `public_message`.
fn map_app_error(public_message: &'static str) -> impl Fn(AppError) -> HandlerError {
    move |err| match err {
        AppError::Validation(message) => {
            warn!("Rejected request: {}", message);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    code: "validation_error".to_string(),
                    message,
                }),
            )
        }
        other => {
            error!("{}: {}", public_message, other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    code: "internal".to_string(),
                    message: public_message.to_string(),
                }),
            )
        }
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(state.meta.clone())
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, redis) = match state.ratings.ping().await {
        Ok(()) => ("healthy", "connected"),
        Err(e) => {
            warn!("Health check: counter store unreachable: {}", e);
            ("degraded", "unavailable")
        }
    };
    Json(HealthResponse {
        status,
        redis,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn refine(
    State(state): State<AppState>,
    payload: Result<Json<RefineRequest>, JsonRejection>,
) -> Result<Json<RefineResponse>, HandlerError> {
    const FAILURE: &str = "Refinement failed";
    let request = body(payload).map_err(map_app_error(FAILURE))?;
    let refinement = state
        .pipeline
        .refine(&request.text, request.language.as_deref())
        .await
        .map_err(map_app_error(FAILURE))?;
    Ok(Json(refinement.into()))
}

pub async fn enhance(
    State(state): State<AppState>,
    payload: Result<Json<EnhanceRequest>, JsonRejection>,
) -> Result<Json<EnhanceResponse>, HandlerError> {
    const FAILURE: &str = "Enhancement failed";
    let request = body(payload).map_err(map_app_error(FAILURE))?;
    let rewrite = state
        .pipeline
        .enhance(request.into())
        .await
        .map_err(map_app_error(FAILURE))?;
    Ok(Json(rewrite))
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<FeedbackResponse>, HandlerError> {
    const FAILURE: &str = "Rating failed";
    let request = body(payload).map_err(map_app_error(FAILURE))?;
    request
        .validate()
        .map_err(AppError::from)
        .map_err(map_app_error(FAILURE))?;

    let global = state
        .ratings
        .record_rating(&request.prompt_id, request.rating)
        .await
        .map_err(map_app_error(FAILURE))?;
    Ok(Json(global.into()))
}

pub async fn prompt_average(
    State(state): State<AppState>,
    query: Result<Query<AvgQuery>, QueryRejection>,
) -> Result<Json<AvgResponse>, HandlerError> {
    const FAILURE: &str = "Failed to read rating";
    let Query(query) = query
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
        .map_err(map_app_error(FAILURE))?;
    query
        .validate()
        .map_err(AppError::from)
        .map_err(map_app_error(FAILURE))?;

    let summary = state
        .ratings
        .average(&query.prompt_id)
        .await
        .map_err(map_app_error(FAILURE))?;
    Ok(Json(summary.into()))
}

pub async fn global_average(
    State(state): State<AppState>,
) -> Result<Json<GlobalAvgResponse>, HandlerError> {
    let summary = state
        .ratings
        .global_average()
        .await
        .map_err(map_app_error("Failed to read global rating"))?;
    Ok(Json(summary.into()))
}
