//! Embedding capability: text to fixed-length dense vectors.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

/// Converts text into a fixed-length dense vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// HTTP client for a hosted feature-extraction endpoint serving a
/// `BAAI/bge-large-en-v1.5`-class model.
///
/// Pooling and normalization are fixed: the vectors already in the index
/// were produced with mean pooling and L2 normalization, and a query vector
/// produced any other way would not live in the same space.
pub struct InferenceEmbedder {
    client: reqwest::Client,
    endpoint: String,
}

const POOLING: &str = "mean";
const NORMALIZE: bool = true;

impl InferenceEmbedder {
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        anyhow::ensure!(
            endpoint.starts_with("http://") || endpoint.starts_with("https://"),
            "embedding endpoint must be an http(s) URL"
        );
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let auth = format!("Bearer {}", key.trim());
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth).context("invalid embedding API key")?,
            );
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build embedding HTTP client")?;
        Ok(Self { client, endpoint: endpoint.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl EmbeddingProvider for InferenceEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request =
            FeatureExtractionRequest { inputs: [text], pooling: POOLING, normalize: NORMALIZE };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("failed to call embedding endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body =
                response.text().await.unwrap_or_else(|_| "<body unavailable>".to_string());
            anyhow::bail!("embedding request failed ({status}): {body}");
        }

        let payload: FeatureExtractionResponse =
            response.json().await.context("failed to parse embedding response")?;
        payload.into_vector()
    }
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: [&'a str; 1],
    pooling: &'a str,
    normalize: bool,
}

/// Feature-extraction servers answer a single input with either a batch of
/// one vector or a bare vector; both shapes are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureExtractionResponse {
    Batch(Vec<Vec<f32>>),
    Single(Vec<f32>),
}

impl FeatureExtractionResponse {
    fn into_vector(self) -> Result<Vec<f32>> {
        match self {
            Self::Single(vector) => Ok(vector),
            Self::Batch(mut vectors) => {
                anyhow::ensure!(!vectors.is_empty(), "embedding response carried no vectors");
                Ok(vectors.swap_remove(0))
            }
        }
    }
}
