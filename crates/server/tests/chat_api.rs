//! End-to-end chat API tests: the real router and runtime driven over HTTP,
//! with scripted capability fakes standing in for the LLM, the embedding
//! endpoint, and the similarity index.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use lumiere_agent::classifier::Classifier;
use lumiere_agent::llm::{GenerationParams, TextGenerator};
use lumiere_agent::responder::Responder;
use lumiere_agent::runtime::ChatRuntime;
use lumiere_retrieval::{CandidateMatch, EmbeddingProvider, RetrievalEngine, SimilarityIndex};
use serde_json::{json, Value};
use tower::ServiceExt;

const DIMENSION: usize = 4;

// ---------------------------------------------------------------------------
// Capability fakes
// ---------------------------------------------------------------------------

/// Pops one scripted response per call; an exhausted script behaves like a
/// capability outage.
struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, String>>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(responses: Vec<Result<&str, &str>>) -> Arc<Self> {
        let responses = responses
            .into_iter()
            .map(|response| response.map(str::to_string).map_err(str::to_string))
            .collect();
        Arc::new(Self { responses: Mutex::new(responses), calls: AtomicUsize::new(0) })
    }

    fn unavailable() -> Arc<Self> {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _system: &str,
        _user: &str,
        _params: GenerationParams,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.lock().expect("script lock").pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("text generation unavailable")),
        }
    }
}

struct StaticEmbedder {
    vector: Vec<f32>,
    calls: AtomicUsize,
}

impl StaticEmbedder {
    fn with_dimension(dimension: usize) -> Arc<Self> {
        Arc::new(Self { vector: vec![0.1; dimension], calls: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl EmbeddingProvider for StaticEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vector.clone())
    }
}

struct ScriptedIndex {
    result: Result<Vec<CandidateMatch>, String>,
    calls: AtomicUsize,
}

impl ScriptedIndex {
    fn with_matches(matches: Vec<CandidateMatch>) -> Arc<Self> {
        Arc::new(Self { result: Ok(matches), calls: AtomicUsize::new(0) })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self { result: Err(message.to_string()), calls: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl SimilarityIndex for ScriptedIndex {
    async fn query(
        &self,
        _vector: &[f32],
        _top_k: usize,
        _include_metadata: bool,
    ) -> Result<Vec<CandidateMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.result {
            Ok(matches) => Ok(matches.clone()),
            Err(message) => Err(anyhow!(message.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures and harness
// ---------------------------------------------------------------------------

fn candidate(id: &str, score: f32, metadata: Value) -> CandidateMatch {
    let metadata = match metadata {
        Value::Object(map) => map,
        _ => panic!("metadata fixture must be a JSON object"),
    };
    CandidateMatch { id: id.to_string(), score, metadata }
}

fn complete_candidate(id: &str, score: f32) -> CandidateMatch {
    candidate(
        id,
        score,
        json!({
            "Product Summary": format!("Item {id}"),
            "Price": "$59.99",
            "Image URL": format!("https://cdn.example.com/{id}.jpg"),
            "Product Category": "Shirts",
        }),
    )
}

fn app(
    generator: Arc<dyn TextGenerator>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn SimilarityIndex>,
) -> Router {
    let runtime = Arc::new(ChatRuntime::new(
        Classifier::new(generator.clone()),
        Responder::new(generator),
        RetrievalEngine::new(embedder, index, DIMENSION),
    ));
    lumiere_server::chat::router(runtime)
}

async fn post_chat(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request should build"),
        )
        .await
        .expect("request should complete");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body should read");
    let payload = serde_json::from_slice(&bytes).expect("body should be JSON");
    (status, payload)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn greeting_reply_carries_no_products() {
    let generator = ScriptedGenerator::new(vec![
        Ok("greeting"),
        Ok("Hello! Looking for a new outfit today?"),
    ]);
    let embedder = StaticEmbedder::with_dimension(DIMENSION);
    let index = ScriptedIndex::with_matches(vec![complete_candidate("prod-1", 0.9)]);

    let (status, payload) =
        post_chat(app(generator, embedder.clone(), index.clone()), json!({"message": "hi"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["type"], "bot");
    assert_eq!(payload["text"], "Hello! Looking for a new outfit today?");
    assert_eq!(payload["products"], json!([]));
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(index.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn product_search_returns_filtered_capped_products() {
    let generator = ScriptedGenerator::new(vec![Ok("product")]);
    let embedder = StaticEmbedder::with_dimension(DIMENSION);
    let index = ScriptedIndex::with_matches(vec![
        complete_candidate("prod-a", 0.95),
        complete_candidate("prod-b", 0.90),
        complete_candidate("prod-a", 0.88), // duplicate of an accepted id
        complete_candidate("prod-low", 0.20),
        candidate(
            "prod-incomplete",
            0.85,
            json!({"Product Summary": "No price or image", "Rating": 4.0}),
        ),
        complete_candidate("prod-c", 0.80),
        complete_candidate("prod-d", 0.75),
        complete_candidate("prod-e", 0.70),
        complete_candidate("prod-f", 0.65),
    ]);

    let (status, payload) =
        post_chat(app(generator, embedder, index), json!({"message": "black shirt"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["text"], "Here are the best matches I found for you:");

    let products = payload["products"].as_array().expect("products array");
    assert_eq!(products.len(), 5);

    let ids: Vec<&str> =
        products.iter().map(|product| product["id"].as_str().expect("id")).collect();
    assert_eq!(ids, ["prod-a", "prod-b", "prod-c", "prod-d", "prod-e"]);

    for product in products {
        assert!(!product["name"].as_str().expect("name").is_empty());
        assert!(!product["price"].as_str().expect("price").is_empty());
        assert!(!product["image"].as_str().expect("image").is_empty());
        assert!(product["score"].as_f64().expect("score") >= 0.3);
    }
}

#[tokio::test]
async fn missing_message_is_rejected_without_capability_calls() {
    let generator = ScriptedGenerator::new(vec![Ok("greeting")]);
    let embedder = StaticEmbedder::with_dimension(DIMENSION);
    let index = ScriptedIndex::with_matches(Vec::new());

    for body in [json!({}), json!({"message": ""}), json!({"message": "   "})] {
        let (status, payload) = post_chat(
            app(generator.clone(), embedder.clone(), index.clone()),
            body,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"], "Message is required");
        assert_eq!(payload["type"], "bot");
        assert_eq!(payload["products"], json!([]));
    }

    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(index.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn dimension_mismatch_maps_to_configuration_error() {
    let generator = ScriptedGenerator::new(vec![Ok("product")]);
    // Three components against a four-dimensional index: a broken deployment.
    let embedder = Arc::new(StaticEmbedder {
        vector: vec![0.1; DIMENSION - 1],
        calls: AtomicUsize::new(0),
    });
    let index = ScriptedIndex::with_matches(vec![complete_candidate("prod-1", 0.9)]);

    let (status, payload) =
        post_chat(app(generator, embedder, index.clone()), json!({"message": "red dress"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload["error"].as_str().expect("error").starts_with("Configuration error:"));
    assert!(payload["text"].as_str().expect("text").contains("Configuration Error"));
    assert_eq!(payload["products"], json!([]));
    assert_eq!(index.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn index_failure_maps_to_internal_error() {
    let generator = ScriptedGenerator::new(vec![Ok("product")]);
    let embedder = StaticEmbedder::with_dimension(DIMENSION);
    let index = ScriptedIndex::failing("connection reset by peer");

    let (status, payload) =
        post_chat(app(generator, embedder, index), json!({"message": "blue jeans"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        payload["text"],
        "I encountered an error while processing your request. Please try again."
    );
    assert_eq!(payload["products"], json!([]));
}

#[tokio::test]
async fn keyword_fallback_routes_product_searches_during_outage() {
    let generator = ScriptedGenerator::unavailable();
    let embedder = StaticEmbedder::with_dimension(DIMENSION);
    let index = ScriptedIndex::with_matches(vec![complete_candidate("prod-1", 0.9)]);

    let (status, payload) =
        post_chat(app(generator, embedder.clone(), index), json!({"message": "black shirt"}))
            .await;

    assert_eq!(status, StatusCode::OK);
    let products = payload["products"].as_array().expect("products array");
    assert_eq!(products.len(), 1);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn outage_general_question_gets_fallback_reply() {
    let generator = ScriptedGenerator::unavailable();
    let embedder = StaticEmbedder::with_dimension(DIMENSION);
    let index = ScriptedIndex::with_matches(Vec::new());

    let (status, payload) = post_chat(
        app(generator, embedder.clone(), index.clone()),
        json!({"message": "what payment methods do you accept"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(payload["text"].as_str().expect("text").contains("amazing fashion items"));
    assert_eq!(payload["products"], json!([]));
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(index.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn zero_surviving_candidates_returns_not_in_stock_reply() {
    let generator = ScriptedGenerator::new(vec![Ok("product")]);
    let embedder = StaticEmbedder::with_dimension(DIMENSION);
    let index = ScriptedIndex::with_matches(vec![
        complete_candidate("prod-1", 0.05),
        complete_candidate("prod-2", 0.12),
    ]);

    let (status, payload) =
        post_chat(app(generator, embedder, index), json!({"message": "unicorn onesie"})).await;

    assert_eq!(status, StatusCode::OK);
    assert!(payload["text"].as_str().expect("text").contains("not in our stock"));
    assert_eq!(payload["products"], json!([]));
}

#[tokio::test]
async fn identical_requests_produce_identical_replies() {
    let request = json!({"message": "red dress"});
    let mut payloads = Vec::new();

    for _ in 0..2 {
        let generator = ScriptedGenerator::new(vec![Ok("product")]);
        let embedder = StaticEmbedder::with_dimension(DIMENSION);
        let index = ScriptedIndex::with_matches(vec![
            complete_candidate("prod-1", 0.9),
            complete_candidate("prod-2", 0.7),
        ]);

        let (status, payload) =
            post_chat(app(generator, embedder, index), request.clone()).await;
        assert_eq!(status, StatusCode::OK);
        payloads.push(payload);
    }

    assert_eq!(payloads[0], payloads[1]);
}
