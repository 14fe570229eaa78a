use crate::error::ExpfmtError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exposition protocol version served by every format below.
pub const PROTOCOL_VERSION: &str = "0.0.4";

// ── Content-Type values for the different wire protocols ──────

pub const FMT_TEXT: &str = "text/plain; version=0.0.4";
pub const FMT_PROTO_DELIM: &str =
    "application/vnd.google.protobuf; proto=io.prometheus.client.MetricFamily; encoding=delimited";
pub const FMT_PROTO_TEXT: &str =
    "application/vnd.google.protobuf; proto=io.prometheus.client.MetricFamily; encoding=text";
pub const FMT_PROTO_COMPACT: &str =
    "application/vnd.google.protobuf; proto=io.prometheus.client.MetricFamily; encoding=compact-text";

// ── Media type pieces matched during negotiation ──────────────

pub(crate) const PROTO_TYPE: &str = "application";
pub(crate) const PROTO_SUBTYPE: &str = "vnd.google.protobuf";
pub(crate) const PROTO_MESSAGE: &str = "io.prometheus.client.MetricFamily";
pub(crate) const TEXT_TYPE: &str = "text";
pub(crate) const TEXT_SUBTYPE: &str = "plain";

/// The closed set of exposition formats this crate can negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpositionFormat {
    /// Prometheus plain text, version 0.0.4. The universal fallback.
    #[default]
    Text,
    /// Binary protobuf `MetricFamily` messages, varint length-prefixed.
    #[serde(rename = "protobuf-delimited")]
    ProtoDelimited,
    /// Multi-line protobuf text format.
    #[serde(rename = "protobuf-text")]
    ProtoText,
    /// Single-line protobuf text format.
    #[serde(rename = "protobuf-compact-text")]
    ProtoCompactText,
}

impl ExpositionFormat {
    pub const ALL: [ExpositionFormat; 4] = [
        ExpositionFormat::Text,
        ExpositionFormat::ProtoDelimited,
        ExpositionFormat::ProtoText,
        ExpositionFormat::ProtoCompactText,
    ];

    /// Canonical Content-Type string for the response header.
    pub const fn content_type(self) -> &'static str {
        match self {
            ExpositionFormat::Text => FMT_TEXT,
            ExpositionFormat::ProtoDelimited => FMT_PROTO_DELIM,
            ExpositionFormat::ProtoText => FMT_PROTO_TEXT,
            ExpositionFormat::ProtoCompactText => FMT_PROTO_COMPACT,
        }
    }

    /// Short operator-facing name (CLI flags, config, metric labels).
    pub const fn name(self) -> &'static str {
        match self {
            ExpositionFormat::Text => "text",
            ExpositionFormat::ProtoDelimited => "protobuf-delimited",
            ExpositionFormat::ProtoText => "protobuf-text",
            ExpositionFormat::ProtoCompactText => "protobuf-compact-text",
        }
    }

    pub const fn is_protobuf(self) -> bool {
        !matches!(self, ExpositionFormat::Text)
    }

    /// Maps a protobuf `encoding` parameter value to its format.
    pub(crate) fn from_proto_encoding(encoding: &str) -> Option<Self> {
        match encoding {
            "delimited" => Some(ExpositionFormat::ProtoDelimited),
            "text" => Some(ExpositionFormat::ProtoText),
            "compact-text" => Some(ExpositionFormat::ProtoCompactText),
            _ => None,
        }
    }
}

impl fmt::Display for ExpositionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExpositionFormat {
    type Err = ExpfmtError;

    /// Accepts either the short name or the full canonical content type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ExpositionFormat::ALL
            .into_iter()
            .find(|f| f.name() == s || f.content_type() == s)
            .ok_or_else(|| ExpfmtError::UnknownFormat(s.to_string()))
    }
}
