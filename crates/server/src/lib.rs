//! HTTP boundary of the LUMIÈRE fashion assistant.
//!
//! The server exposes exactly one caller-facing operation — a user message
//! in, a chat reply plus product list out — and a readiness endpoint. All
//! conversational and retrieval logic lives in `lumiere-agent` and
//! `lumiere-retrieval`; this crate wires capability clients to the runtime
//! and shapes every outcome into the uniform reply envelope.

pub mod bootstrap;
pub mod chat;
pub mod health;
