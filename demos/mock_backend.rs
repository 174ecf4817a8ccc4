//! Stand-in for the backend query service, for trying the gateway locally:
//!
//! ```text
//! cargo run --example mock_backend
//! BACKEND_URL=http://127.0.0.1:8081 cargo run
//! cargo run --bin query-cli -- -a dev-assertion query "what is the travel policy?"
//! ```

use axum::{
    extract::Query,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;

#[derive(Deserialize)]
struct QueryIn {
    query: String,
}

#[derive(Deserialize)]
struct RawChunksParams {
    q: String,
    #[serde(default = "default_k")]
    k: u32,
}

fn default_k() -> u32 {
    5
}

fn header(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn query(headers: HeaderMap, Json(body): Json<QueryIn>) -> Json<Value> {
    Json(json!({
        "answer": format!("You asked: {}", body.query.trim()),
        "citations": [{"source": "travel_policy.pdf", "page": 3}],
        "domain": header(&headers, "x-user-domain"),
        "clearance": header(&headers, "x-user-clearance"),
    }))
}

async fn raw_chunks(Query(params): Query<RawChunksParams>) -> Json<Value> {
    let items: Vec<Value> = (0..params.k)
        .map(|i| json!({"datapoint_id": format!("chunk-{}", i), "text": params.q}))
        .collect();
    Json(json!({"count": items.len(), "items": items}))
}

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/query", post(query))
        .route("/debug/raw_chunks_get", get(raw_chunks));

    let addr = SocketAddr::from(([127, 0, 0, 1], 8081));
    println!("Mock query backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
