use crate::encoder::{encode_all, Encoder};
use crate::error::EncodeError;
use expfmt_core::format::ExpositionFormat;
use expfmt_core::negotiate::negotiate;
use prometheus::proto::MetricFamily;
use prometheus::Registry;
use tracing::trace;

/// A fully encoded scrape body.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub format: ExpositionFormat,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Negotiate from an Accept header value and encode all families in memory.
pub fn render(families: &[MetricFamily], accept: &str) -> Result<Rendered, EncodeError> {
    render_format(families, negotiate(accept))
}

/// Encode all families in a fixed format, skipping negotiation.
pub fn render_format(
    families: &[MetricFamily],
    format: ExpositionFormat,
) -> Result<Rendered, EncodeError> {
    let mut encoder = Encoder::new(Vec::new(), format);
    encode_all(&mut encoder, families)?;
    let body = encoder.into_inner();
    trace!(format = %format, families = families.len(), bytes = body.len(), "Rendered families");
    Ok(Rendered {
        format,
        content_type: format.content_type(),
        body,
    })
}

/// Gather a registry and render it for the given Accept header value.
pub fn render_registry(registry: &Registry, accept: &str) -> Result<Rendered, EncodeError> {
    render(&registry.gather(), accept)
}
