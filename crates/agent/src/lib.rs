//! Conversational layer of the LUMIÈRE assistant.
//!
//! One user message comes in, one reply goes out:
//!
//! 1. **Classification** (`classifier`) — decide whether the message is a
//!    greeting, a general question, or a product search. Model first, fixed
//!    keyword rule as the outage fallback; never fails.
//! 2. **Dispatch** (`runtime`) — conversational intents go to the
//!    `responder`, product intents to the retrieval engine.
//! 3. **Reply shaping** — every outcome is normalized into a `ChatReply`
//!    so the HTTP boundary never branches per failure type.
//!
//! The text-generation capability behind classification and replies is the
//! `TextGenerator` trait in `llm`; the production implementation talks to
//! Groq's OpenAI-compatible chat-completions API.

pub mod classifier;
pub mod llm;
pub mod responder;
pub mod runtime;
