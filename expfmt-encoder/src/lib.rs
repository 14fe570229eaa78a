pub mod encoder;
pub mod error;
pub mod metrics;
pub mod render;

pub use encoder::{encode_all, negotiate_encoder, Encoder, MetricEncoder};
pub use error::EncodeError;
pub use metrics::ScrapeMetrics;
pub use render::{render, render_format, render_registry, Rendered};
