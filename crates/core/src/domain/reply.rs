use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

/// The unit returned to the caller for every chat turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(rename = "type")]
    pub kind: ReplyKind,
    pub text: String,
    pub products: Vec<Product>,
}

/// Discriminator on the wire. Only bot-authored replies exist today; user
/// turns never round-trip through the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyKind {
    Bot,
}

impl ChatReply {
    pub fn bot(text: impl Into<String>) -> Self {
        Self { kind: ReplyKind::Bot, text: text.into(), products: Vec::new() }
    }

    pub fn with_products(text: impl Into<String>, products: Vec<Product>) -> Self {
        Self { kind: ReplyKind::Bot, text: text.into(), products }
    }
}
