use serde::{Deserialize, Serialize};

/// Display-ready product entry returned to the chat client.
///
/// `id` and `score` come straight from the similarity index; every other
/// field is projected out of index metadata. Name, price, and image are
/// guaranteed non-empty by the reduction pass; the remaining fields carry
/// defaults when the indexed record omits them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: String,
    pub rating: f64,
    pub image: String,
    pub score: f32,
    pub category: String,
    pub color: String,
    pub gender: String,
    pub url: String,
}
