//! Reduces raw index candidates into the final display-ready product list.
//!
//! The index's own ranking is authoritative: this pass removes and reshapes
//! candidates but never re-orders them.

use std::collections::HashSet;

use lumiere_core::Product;
use serde_json::{Map, Value};
use tracing::debug;

use crate::index::CandidateMatch;

/// Upper bound on products returned for one search.
pub const MAX_PRODUCTS: usize = 5;

/// Candidates scoring below this are empirically unrelated to the query.
pub const MIN_SCORE: f32 = 0.3;

/// Tolerated metadata key variants per display field, preferred key first.
/// The indexed records do not share a uniform schema, so each field is
/// resolved through its own small priority list.
const NAME_KEYS: [&str; 2] = ["Product Summary", "text"];
const PRICE_KEYS: [&str; 2] = ["Price", "price"];
const IMAGE_KEYS: [&str; 2] = ["Image URL", "image"];
const RATING_KEYS: [&str; 2] = ["Rating", "rating"];
const CATEGORY_KEYS: [&str; 1] = ["Product Category"];
const COLOR_KEYS: [&str; 1] = ["Product Color"];
const GENDER_KEYS: [&str; 1] = ["Gender"];
const URL_KEYS: [&str; 1] = ["Product URL"];

const DEFAULT_RATING: f64 = 4.5;

/// Deduplicates, quality-filters, and projects `matches` into at most
/// [`MAX_PRODUCTS`] products, preserving the input ordering. The pass stops
/// as soon as enough products are accepted.
pub fn reduce(matches: &[CandidateMatch]) -> Vec<Product> {
    let mut accepted_ids: HashSet<String> = HashSet::new();
    let mut products = Vec::new();

    for candidate in matches {
        if products.len() == MAX_PRODUCTS {
            break;
        }

        if accepted_ids.contains(candidate.id.as_str()) {
            debug!(
                event_name = "retrieval.reduce.duplicate",
                id = %candidate.id,
                "skipping duplicate candidate"
            );
            continue;
        }

        if candidate.score < MIN_SCORE {
            debug!(
                event_name = "retrieval.reduce.low_score",
                id = %candidate.id,
                score = candidate.score,
                "skipping candidate below score cutoff"
            );
            continue;
        }

        let Some(product) = project(candidate) else {
            debug!(
                event_name = "retrieval.reduce.incomplete",
                id = %candidate.id,
                "skipping candidate with incomplete metadata"
            );
            continue;
        };

        accepted_ids.insert(candidate.id.clone());
        products.push(product);
    }

    products
}

/// Completeness gate and projection in one step: a candidate missing name,
/// price, or image under both tolerated key variants is rejected outright.
/// Only secondary display fields are defaulted.
fn project(candidate: &CandidateMatch) -> Option<Product> {
    let metadata = &candidate.metadata;

    let name = text_field(metadata, &NAME_KEYS)?;
    let price = text_field(metadata, &PRICE_KEYS)?;
    let image = text_field(metadata, &IMAGE_KEYS)?;

    Some(Product {
        id: candidate.id.clone(),
        name,
        price,
        rating: rating_field(metadata),
        image,
        score: candidate.score,
        category: text_field(metadata, &CATEGORY_KEYS).unwrap_or_default(),
        color: text_field(metadata, &COLOR_KEYS).unwrap_or_default(),
        gender: text_field(metadata, &GENDER_KEYS).unwrap_or_default(),
        url: text_field(metadata, &URL_KEYS).unwrap_or_default(),
    })
}

/// Resolves a field through its key priority list, accepting the first
/// variant carrying a non-blank string or a number.
fn text_field(metadata: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| metadata.get(*key).and_then(value_text))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn rating_field(metadata: &Map<String, Value>) -> f64 {
    RATING_KEYS
        .iter()
        .find_map(|key| metadata.get(*key))
        .and_then(|value| match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        })
        .unwrap_or(DEFAULT_RATING)
}
