use thiserror::Error;

/// Unified error type for expfmt-core.
///
/// Negotiation itself never fails; these only come from configuration and
/// from parsing format names supplied by an operator.
#[derive(Error, Debug)]
pub enum ExpfmtError {
    #[error("Unknown exposition format: {0}")]
    UnknownFormat(String),

    #[error("Config error: {0}")]
    Config(#[from] figment::Error),

    #[error("Invalid metrics path {path:?}: {reason}")]
    InvalidMetricsPath { path: String, reason: &'static str },
}

impl ExpfmtError {
    /// Short machine-readable label, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ExpfmtError::UnknownFormat(_) => "unknown_format",
            ExpfmtError::Config(_) => "config",
            ExpfmtError::InvalidMetricsPath { .. } => "invalid_metrics_path",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_format_message_names_the_input() {
        let err = ExpfmtError::UnknownFormat("yaml".into());
        assert_eq!(err.to_string(), "Unknown exposition format: yaml");
        assert_eq!(err.kind(), "unknown_format");
    }

    #[test]
    fn invalid_metrics_path_message_names_path_and_reason() {
        let err = ExpfmtError::InvalidMetricsPath {
            path: "/health".into(),
            reason: "reserved for the health check",
        };
        assert_eq!(
            err.to_string(),
            "Invalid metrics path \"/health\": reserved for the health check"
        );
        assert_eq!(err.kind(), "invalid_metrics_path");
    }
}
