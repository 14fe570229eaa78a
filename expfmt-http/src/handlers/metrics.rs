use crate::server::HttpState;
use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use expfmt_core::negotiate::negotiate_headers;
use expfmt_encoder::render_format;
use http::header::{CONTENT_TYPE, HeaderMap};
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

/// Prometheus scrape handler. The response format follows the request's
/// Accept header; anything unrecognised gets plain text.
pub async fn scrape(State(state): State<Arc<HttpState>>, headers: HeaderMap) -> Response {
    let format = negotiate_headers(&headers);
    let families = state.gather();

    let started = Instant::now();
    let rendered = render_format(&families, format);
    state
        .metrics
        .record_render(format, started.elapsed().as_secs_f64(), rendered.is_ok());

    match rendered {
        Ok(r) => ([(CONTENT_TYPE, r.content_type)], r.body).into_response(),
        Err(e) => {
            error!(error = %e, kind = e.kind(), format = %format, "Failed to encode scrape");
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            (
                status,
                Json(json!({ "error": e.to_string(), "status": status.as_u16() })),
            )
                .into_response()
        }
    }
}
