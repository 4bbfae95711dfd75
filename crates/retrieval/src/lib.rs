//! Product retrieval: embeddings, similarity search, and result reduction.
//!
//! The pipeline is `message -> embedding -> top-K candidates -> reduce`:
//! the embedding and index capabilities are consumed through narrow traits
//! (`EmbeddingProvider`, `SimilarityIndex`), and the reducer turns raw index
//! hits into the short, deduplicated, display-ready product list the chat
//! boundary returns. Unlike the conversational path, retrieval failures
//! propagate to the caller.

pub mod embedder;
pub mod engine;
pub mod index;
pub mod reducer;

pub use embedder::{EmbeddingProvider, InferenceEmbedder};
pub use engine::{RetrievalEngine, RetrievalError, TOP_K};
pub use index::{CandidateMatch, PineconeIndex, SimilarityIndex};
pub use reducer::{reduce, MAX_PRODUCTS, MIN_SCORE};
