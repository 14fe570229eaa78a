use crate::accept::{parse_accept, MediaRange};
use crate::format::{
    ExpositionFormat, PROTOCOL_VERSION, PROTO_MESSAGE, PROTO_SUBTYPE, PROTO_TYPE, TEXT_SUBTYPE,
    TEXT_TYPE,
};
use http::header::{HeaderMap, ACCEPT};
use tracing::debug;

/// Picks the exposition format for an Accept header value.
///
/// Walks the parsed ranges in preference order and returns the first one
/// that names a supported format. Falls back to [`ExpositionFormat::Text`]
/// when nothing matches, so this never fails.
///
/// ```
/// use expfmt_core::format::ExpositionFormat;
/// use expfmt_core::negotiate::negotiate;
///
/// let accept = "application/vnd.google.protobuf;proto=io.prometheus.client.MetricFamily;encoding=delimited";
/// assert_eq!(negotiate(accept), ExpositionFormat::ProtoDelimited);
/// assert_eq!(negotiate("application/json"), ExpositionFormat::Text);
/// ```
pub fn negotiate(accept: &str) -> ExpositionFormat {
    let format = parse_accept(accept)
        .iter()
        .find_map(match_range)
        .unwrap_or_default();
    debug!(accept, format = %format, "Negotiated exposition format");
    format
}

/// Same as [`negotiate`], reading the first `Accept` header of a request.
/// A missing or non-UTF-8 header counts as empty.
pub fn negotiate_headers(headers: &HeaderMap) -> ExpositionFormat {
    let accept = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    negotiate(accept)
}

/// Matches one media range against the format table.
fn match_range(range: &MediaRange) -> Option<ExpositionFormat> {
    if range.is_type(PROTO_TYPE, PROTO_SUBTYPE) {
        if range.param("proto") != Some(PROTO_MESSAGE) {
            return None;
        }
        return range
            .param("encoding")
            .and_then(ExpositionFormat::from_proto_encoding);
    }

    if range.is_type(TEXT_TYPE, TEXT_SUBTYPE) {
        return match range.param("version") {
            None | Some("") => Some(ExpositionFormat::Text),
            Some(v) if v == PROTOCOL_VERSION => Some(ExpositionFormat::Text),
            Some(_) => None,
        };
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn range(s: &str) -> MediaRange {
        MediaRange::parse(s).unwrap()
    }

    #[test]
    fn proto_range_requires_message_name() {
        assert_eq!(
            match_range(&range("application/vnd.google.protobuf;encoding=delimited")),
            None
        );
        assert_eq!(
            match_range(&range(
                "application/vnd.google.protobuf;proto=other.Message;encoding=delimited"
            )),
            None
        );
    }

    #[test]
    fn proto_range_without_encoding_does_not_match() {
        assert_eq!(
            match_range(&range(
                "application/vnd.google.protobuf;proto=io.prometheus.client.MetricFamily"
            )),
            None
        );
    }

    #[test]
    fn text_range_with_empty_version_matches() {
        assert_eq!(
            match_range(&range("text/plain;version=")),
            Some(ExpositionFormat::Text)
        );
    }

    #[test]
    fn wildcards_never_match_directly() {
        assert_eq!(match_range(&range("*/*")), None);
        assert_eq!(match_range(&range("text/*")), None);
    }

    #[test]
    fn headers_without_accept_default_to_text() {
        assert_eq!(negotiate_headers(&HeaderMap::new()), ExpositionFormat::Text);
    }

    #[test]
    fn headers_use_accept_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "application/vnd.google.protobuf;proto=io.prometheus.client.MetricFamily;encoding=text",
            ),
        );
        assert_eq!(negotiate_headers(&headers), ExpositionFormat::ProtoText);
    }

    #[test]
    fn headers_with_non_utf8_accept_default_to_text() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_bytes(b"text/\xffplain").unwrap());
        assert_eq!(negotiate_headers(&headers), ExpositionFormat::Text);
    }

    #[test]
    fn headers_read_first_accept_value_only() {
        let mut headers = HeaderMap::new();
        headers.append(ACCEPT, HeaderValue::from_static("text/plain"));
        headers.append(
            ACCEPT,
            HeaderValue::from_static(
                "application/vnd.google.protobuf;proto=io.prometheus.client.MetricFamily;encoding=delimited",
            ),
        );
        assert_eq!(negotiate_headers(&headers), ExpositionFormat::Text);
    }
}
