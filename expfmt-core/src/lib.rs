pub mod accept;
pub mod config;
pub mod error;
pub mod format;
pub mod negotiate;

pub use accept::{parse_accept, MediaRange, Specificity};
pub use config::ExporterConfig;
pub use error::ExpfmtError;
pub use format::ExpositionFormat;
pub use negotiate::{negotiate, negotiate_headers};
