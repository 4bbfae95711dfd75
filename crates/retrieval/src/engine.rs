//! Retrieval engine: message in, reduced product list out.

use std::sync::Arc;

use lumiere_core::Product;
use thiserror::Error;
use tracing::{debug, info};

use crate::embedder::EmbeddingProvider;
use crate::index::SimilarityIndex;
use crate::reducer;

/// Candidates requested per query. Filtering drops an unpredictable number
/// of duplicates and incomplete records, so the index is asked for far more
/// than the reply can carry.
pub const TOP_K: usize = 20;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("query embedding has {actual} dimensions but the index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("similarity index rejected the query vector dimensions: {0}")]
    IndexDimension(#[source] anyhow::Error),
    #[error("embedding generation failed: {0}")]
    Embedding(#[source] anyhow::Error),
    #[error("similarity index query failed: {0}")]
    Index(#[source] anyhow::Error),
}

impl RetrievalError {
    /// True when the failure points at deployment configuration (embedding
    /// model and index schema disagreeing) rather than a transient fault.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. } | Self::IndexDimension(_))
    }
}

pub struct RetrievalEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn SimilarityIndex>,
    dimension: usize,
}

impl RetrievalEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn SimilarityIndex>,
        dimension: usize,
    ) -> Self {
        Self { embedder, index, dimension }
    }

    /// Embeds `message`, queries the index, and returns the reduced product
    /// list, best match first. Embedding and index failures both propagate.
    pub async fn search(&self, message: &str) -> Result<Vec<Product>, RetrievalError> {
        let vector = self.embedder.embed(message).await.map_err(RetrievalError::Embedding)?;
        if vector.len() != self.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        debug!(
            event_name = "retrieval.embedded",
            dimensions = vector.len(),
            "query embedding generated"
        );

        let matches =
            self.index.query(&vector, TOP_K, true).await.map_err(classify_index_error)?;
        info!(
            event_name = "retrieval.matched",
            raw = matches.len(),
            "similarity index returned candidates"
        );

        let products = reducer::reduce(&matches);
        info!(
            event_name = "retrieval.reduced",
            kept = products.len(),
            "candidates reduced to final products"
        );
        Ok(products)
    }
}

/// The index client reports failures as opaque text; a mention of
/// "dimension" anywhere in the chain is the only remaining signal that the
/// index schema and the embedding model disagree.
fn classify_index_error(error: anyhow::Error) -> RetrievalError {
    if format!("{error:#}").to_ascii_lowercase().contains("dimension") {
        RetrievalError::IndexDimension(error)
    } else {
        RetrievalError::Index(error)
    }
}
