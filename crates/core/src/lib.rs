pub mod config;
pub mod domain;

pub use domain::intent::Intent;
pub use domain::product::Product;
pub use domain::reply::{ChatReply, ReplyKind};
