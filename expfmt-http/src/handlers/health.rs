use crate::server::HttpState;
use axum::extract::State;
use axum::response::Json;
use expfmt_core::format::{ExpositionFormat, PROTOCOL_VERSION};
use serde_json::{Value, json};
use std::sync::Arc;

pub async fn health_check(State(state): State<Arc<HttpState>>) -> Json<Value> {
    let formats: Vec<Value> = ExpositionFormat::ALL
        .iter()
        .map(|f| json!({ "name": f.name(), "content_type": f.content_type() }))
        .collect();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "protocol_version": PROTOCOL_VERSION,
        "self_metrics": state.metrics.is_enabled(),
        "formats": formats,
    }))
}
