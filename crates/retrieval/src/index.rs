//! Similarity-index capability: nearest-neighbor lookup over product vectors.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One raw hit from the similarity index, before filtering and shaping.
///
/// `metadata` is an opaque mapping: keys are not guaranteed present and the
/// indexed records do not share a uniform schema.
#[derive(Clone, Debug, Deserialize)]
pub struct CandidateMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Returns the nearest candidates for a query vector, best first. The index
/// is populated externally; this service only reads.
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<CandidateMatch>>;
}

/// Pinecone data-plane client.
pub struct PineconeIndex {
    client: reqwest::Client,
    endpoint: String,
}

impl PineconeIndex {
    pub fn new(host: String, api_key: String, timeout: Duration) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing Pinecone API key");
        anyhow::ensure!(
            host.starts_with("http://") || host.starts_with("https://"),
            "Pinecone host must be an http(s) URL"
        );
        let mut headers = HeaderMap::new();
        headers.insert(
            "Api-Key",
            HeaderValue::from_str(api_key.trim()).context("invalid Pinecone API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build Pinecone HTTP client")?;
        Ok(Self { client, endpoint: format!("{}/query", host.trim_end_matches('/')) })
    }
}

#[async_trait]
impl SimilarityIndex for PineconeIndex {
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<CandidateMatch>> {
        let request = QueryRequest { vector, top_k, include_metadata };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("failed to call similarity index")?;

        let status = response.status();
        if !status.is_success() {
            let body =
                response.text().await.unwrap_or_else(|_| "<body unavailable>".to_string());
            anyhow::bail!("similarity index query failed ({status}): {body}");
        }

        let payload: QueryResponse =
            response.json().await.context("failed to parse similarity index response")?;
        Ok(payload.matches)
    }
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    #[serde(rename = "topK")]
    top_k: usize,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<CandidateMatch>,
}
