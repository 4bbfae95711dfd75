use std::sync::Arc;
use std::time::Duration;

use lumiere_agent::classifier::Classifier;
use lumiere_agent::llm::ChatCompletionsClient;
use lumiere_agent::responder::Responder;
use lumiere_agent::runtime::ChatRuntime;
use lumiere_core::config::{AppConfig, ConfigError};
use lumiere_retrieval::{InferenceEmbedder, PineconeIndex, RetrievalEngine};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub runtime: Arc<ChatRuntime>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("LLM client construction failed: {0}")]
    Llm(#[source] anyhow::Error),
    #[error("embedding client construction failed: {0}")]
    Embedding(#[source] anyhow::Error),
    #[error("similarity index client construction failed: {0}")]
    Index(#[source] anyhow::Error),
}

/// Builds the chat runtime from validated configuration. Capability clients
/// are constructed exactly once per process and shared through the runtime;
/// requests never build clients of their own.
pub fn build_runtime(config: &AppConfig) -> Result<Arc<ChatRuntime>, BootstrapError> {
    let generator = Arc::new(
        ChatCompletionsClient::new(
            expose_required(&config.llm.api_key),
            config.llm.base_url.clone(),
            config.llm.model.clone(),
            Duration::from_secs(config.llm.timeout_secs),
        )
        .map_err(BootstrapError::Llm)?,
    );

    let embedder = Arc::new(
        InferenceEmbedder::new(
            config.embedding.endpoint.clone(),
            config
                .embedding
                .api_key
                .as_ref()
                .map(|key| key.expose_secret().to_string()),
            Duration::from_secs(config.embedding.timeout_secs),
        )
        .map_err(BootstrapError::Embedding)?,
    );

    let index = Arc::new(
        PineconeIndex::new(
            config.index.host.clone(),
            expose_required(&config.index.api_key),
            Duration::from_secs(config.index.timeout_secs),
        )
        .map_err(BootstrapError::Index)?,
    );

    let retrieval = RetrievalEngine::new(embedder, index, config.embedding.dimension);
    let runtime = ChatRuntime::new(
        Classifier::new(generator.clone()),
        Responder::new(generator),
        retrieval,
    );

    info!(
        event_name = "system.bootstrap.ready",
        llm_model = %config.llm.model,
        embedding_model = %config.embedding.model,
        embedding_dimension = config.embedding.dimension,
        "capability clients constructed"
    );

    Ok(Arc::new(runtime))
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let runtime = build_runtime(&config)?;
    Ok(Application { config, runtime })
}

/// Validation guarantees required keys are present; an empty string here is
/// unreachable and rejected again by the client constructor.
fn expose_required(key: &Option<secrecy::SecretString>) -> String {
    key.as_ref().map(|value| value.expose_secret().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use lumiere_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use super::bootstrap_with_config;

    #[test]
    fn bootstrap_builds_a_runtime_from_valid_config() {
        let config = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                llm_api_key: Some("gsk-test".to_string()),
                index_api_key: Some("pc-test".to_string()),
                index_host: Some("https://lumiere-test.svc.pinecone.io".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("config should load");

        let application = bootstrap_with_config(config).expect("bootstrap should succeed");
        assert_eq!(application.config.embedding.dimension, 1024);
    }
}
