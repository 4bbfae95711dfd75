//! Conversational replies for non-product intents.

use std::sync::Arc;

use lumiere_core::{ChatReply, Intent};
use tracing::warn;

use crate::llm::{GenerationParams, TextGenerator};

const GREETING_PERSONA: &str = "You are a helpful, friendly, and stylish fashion assistant for a brand called 'LUMIÈRE'. Respond to the user's greeting warmly and ask how you can help them find their perfect style today. Keep it concise (2-3 sentences max).";

const GENERAL_PERSONA: &str = "You are a helpful fashion assistant for LUMIÈRE, a premium fashion brand. Answer questions about:\n- What products we sell (shirts, dresses, pants, shoes, accessories for men and women)\n- How to use the chatbot (just ask for products like \"black shirt\" or \"red dress\")\n- Fashion advice and styling tips\n- Our services\n\nKeep responses concise (2-4 sentences). If they ask about specific products, encourage them to search (e.g., \"Try asking for 'black shirt for men'\").";

const GREETING_FALLBACK: &str =
    "Hello! 👋 I'm your personal fashion assistant. How can I help you find the perfect look today?";

const GENERAL_FALLBACK: &str = "I'm here to help you find amazing fashion items! You can ask me for specific products like 'black shirt' or 'red dress', and I'll show you our best matches.";

pub struct Responder {
    generator: Arc<dyn TextGenerator>,
}

impl Responder {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Produces the conversational reply for a greeting or general message.
    /// The caller always gets a reply: generation failures and empty model
    /// output both resolve to the intent's fixed fallback sentence.
    pub async fn respond(&self, message: &str, intent: Intent) -> ChatReply {
        let (persona, fallback) = match intent {
            Intent::Greeting => (GREETING_PERSONA, GREETING_FALLBACK),
            _ => (GENERAL_PERSONA, GENERAL_FALLBACK),
        };

        let generated =
            self.generator.generate(persona, message, GenerationParams::default()).await;
        let text = match generated {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => fallback.to_string(),
            Err(error) => {
                warn!(
                    event_name = "chat.respond.generation_failed",
                    intent = intent.as_str(),
                    error = %format!("{error:#}"),
                    "reply generation failed, using fallback text"
                );
                fallback.to_string()
            }
        };

        ChatReply::bot(text)
    }
}
