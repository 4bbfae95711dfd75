//! Intent classification: model first, keyword rule second, general last.

use std::sync::Arc;

use lumiere_core::Intent;
use tracing::{debug, warn};

use crate::llm::{GenerationParams, TextGenerator};

const CLASSIFY_INSTRUCTION: &str = "You are a query classifier for a fashion e-commerce chatbot. Classify the user's message into ONE of these categories:\n- \"greeting\": Simple greetings like hi, hello, hey\n- \"general\": General questions about the store, help, services, or conversational queries\n- \"product\": Specific product searches or requests for clothing items\n\nRespond with ONLY ONE WORD: greeting, general, or product";

const CLASSIFY_TEMPERATURE: f32 = 0.1;

/// Garment, color, style, occasion, and audience words that mark a message
/// as a product search when the model tier is unavailable. Matched against
/// whole words only.
const PRODUCT_KEYWORDS: [&str; 43] = [
    "shirt", "dress", "pant", "jean", "jacket", "coat", "shoe", "sneaker", "boot", "bag",
    "watch", "sunglass", "hat", "cap", "skirt", "blouse", "sweater", "hoodie", "tshirt", "top",
    "bottom", "outfit", "clothing", "wear", "fashion", "style", "black", "white", "red", "blue",
    "green", "yellow", "pink", "purple", "orange", "men", "women", "kids", "casual", "formal",
    "party", "wedding", "office",
];

pub struct Classifier {
    generator: Arc<dyn TextGenerator>,
}

impl Classifier {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Resolves the intent of `message`. Strategies run in a fixed order:
    /// the model, the keyword rule, then the general default. The chain
    /// always lands on a valid intent; classification never fails.
    ///
    /// Only the model tier can produce [`Intent::Greeting`]. The fallback
    /// tiers stop at product-or-general.
    pub async fn classify(&self, message: &str) -> Intent {
        if let Some(intent) = self.model_intent(message).await {
            return intent;
        }
        keyword_intent(message).unwrap_or(Intent::General)
    }

    async fn model_intent(&self, message: &str) -> Option<Intent> {
        let params = GenerationParams { temperature: Some(CLASSIFY_TEMPERATURE) };
        match self.generator.generate(CLASSIFY_INSTRUCTION, message, params).await {
            Ok(response) => {
                let intent = Intent::parse_token(&response);
                debug!(
                    event_name = "chat.classify.model",
                    response = %response.trim(),
                    resolved = intent.is_some(),
                    "model classification response"
                );
                intent
            }
            Err(error) => {
                warn!(
                    event_name = "chat.classify.model_failed",
                    error = %format!("{error:#}"),
                    "model classification failed, falling back to keyword rule"
                );
                None
            }
        }
    }
}

/// Keyword tier: any whole-word hit marks the message as a product search.
fn keyword_intent(message: &str) -> Option<Intent> {
    let lowered = message.to_ascii_lowercase();
    lowered
        .split(|character: char| !character.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .any(|token| PRODUCT_KEYWORDS.contains(&token))
        .then_some(Intent::Product)
}
