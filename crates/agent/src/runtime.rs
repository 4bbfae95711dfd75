//! Chat runtime: one message in, one reply out.

use lumiere_core::{ChatReply, Intent};
use lumiere_retrieval::{RetrievalEngine, RetrievalError};
use thiserror::Error;
use tracing::info;

use crate::classifier::Classifier;
use crate::responder::Responder;

/// Success text shown above a non-empty product list.
const MATCHES_TEXT: &str = "Here are the best matches I found for you:";

/// Reply used when every candidate was filtered away. An empty result is a
/// valid outcome, not a failure.
const OUT_OF_STOCK_TEXT: &str = "Sorry, this product is currently not in our stock. Would you like to try searching for something else?";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message is required")]
    MissingMessage,
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

pub struct ChatRuntime {
    classifier: Classifier,
    responder: Responder,
    retrieval: RetrievalEngine,
}

impl ChatRuntime {
    pub fn new(classifier: Classifier, responder: Responder, retrieval: RetrievalEngine) -> Self {
        Self { classifier, responder, retrieval }
    }

    /// Handles one user turn. A blank message is rejected before any
    /// capability is consulted. Conversational intents always resolve to a
    /// reply; only product retrieval can fail.
    pub async fn handle_message(&self, message: &str) -> Result<ChatReply, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::MissingMessage);
        }

        let intent = self.classifier.classify(message).await;
        info!(event_name = "chat.classified", intent = intent.as_str(), "message classified");

        match intent {
            Intent::Greeting | Intent::General => Ok(self.responder.respond(message, intent).await),
            Intent::Product => {
                let products = self.retrieval.search(message).await?;
                if products.is_empty() {
                    Ok(ChatReply::bot(OUT_OF_STOCK_TEXT))
                } else {
                    Ok(ChatReply::with_products(MATCHES_TEXT, products))
                }
            }
        }
    }
}
