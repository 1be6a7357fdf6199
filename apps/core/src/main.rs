// Promptodactyl Backend Entry Point
// Refinement, enhancement and ratings behind one HTTP API

mod brain;
mod config;
mod error;
mod llm;
mod models;
mod orchestrator;
mod ratings;
mod server;
mod telemetry;

#[cfg(test)]
mod tests;

use config::{AppConfig, StoreBackend};
use llm::{LlmClient, OpenAiClient};
use orchestrator::PromptPipeline;
use ratings::{CounterStore, InMemoryCounterStore, RatingsAggregator, RedisCounterStore};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    telemetry::init(config.log_format);

    if config.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; generation calls will be rejected upstream");
    }
    let client = OpenAiClient::new(&config.base_url, config.model.clone(), config.api_key.clone());
    info!(
        "Using model {} at {} (timeout {}s)",
        client.model(),
        config.base_url,
        config.timeouts.primary.as_secs_f64()
    );
    info!(
        template_version = brain::templates::TEMPLATE_VERSION,
        category_table_version = brain::category::CATEGORY_TABLE_VERSION,
        "Instruction tables loaded"
    );
    let llm: Arc<dyn LlmClient> = Arc::new(client);
    let pipeline = PromptPipeline::new(llm, config.prompt_policy, config.timeouts);

    let store: Arc<dyn CounterStore> = match &config.store {
        StoreBackend::Redis(url) => Arc::new(RedisCounterStore::new(url)?),
        StoreBackend::Memory => {
            warn!("Using in-memory rating store; ratings are lost on restart");
            Arc::new(InMemoryCounterStore::new())
        }
    };
    let ratings = RatingsAggregator::new(store, config.store_timeout);
    if let Err(e) = ratings.ping().await {
        warn!("Counter store not reachable at startup: {}", e);
    }

    let app = server::router(server::AppState::new(pipeline, ratings), &config.allowed_origins);
    server::serve(app, config.listen).await
}
