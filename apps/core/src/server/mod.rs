//! # Server Module
//!
//! HTTP surface over the prompt pipeline and the ratings aggregator.
//!
//! ## Components
//!
//! - **router**: routes, shared state and the CORS policy
//! - **handlers**: request extraction, validation and error mapping

mod handlers;

use crate::models::RootResponse;
use crate::orchestrator::PromptPipeline;
use crate::ratings::RatingsAggregator;
use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

pub const SERVICE_NAME: &str = "Promptodactyl API";

/// Shared by every request; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: PromptPipeline,
    pub ratings: RatingsAggregator,
    pub meta: RootResponse,
}

impl AppState {
    pub fn new(pipeline: PromptPipeline, ratings: RatingsAggregator) -> Self {
        Self {
            pipeline,
            ratings,
            meta: RootResponse {
                service: SERVICE_NAME,
                status: "running",
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }
}

pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/refine", post(handlers::refine))
        .route("/enhance", post(handlers::enhance))
        .route("/feedback", post(handlers::submit_feedback))
        .route("/feedback/avg", get(handlers::prompt_average))
        .route("/feedback/global-avg", get(handlers::global_average))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring unparsable CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}

/// Binds `listen` and serves until Ctrl-C.
pub async fn serve(app: Router, listen: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .context("bind server listener failed")?;
    info!("{} listening on http://{}", SERVICE_NAME, listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
        .context("server terminated with error")
}
