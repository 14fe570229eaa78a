//! Accept header parsing.
//!
//! Parsing is permissive: a segment that cannot be understood is dropped and
//! the rest of the header still counts. An empty header yields no ranges.

use tracing::trace;

/// How precisely a media range names a type. Ordered from least to most
/// specific, so `Exact` sorts first among equal quality weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Specificity {
    /// `*/*`
    Wildcard,
    /// `type/*`
    TypeWildcard,
    /// `type/subtype`
    Exact,
}

/// One entry of an Accept header, e.g. `text/plain;version=0.0.4;q=0.5`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    type_: String,
    subtype: String,
    /// Parameters in the order they were written. Includes the raw `q`.
    params: Vec<(String, String)>,
    quality: f32,
    specificity: Specificity,
}

impl MediaRange {
    /// Parses a single media range segment. Returns `None` for malformed input.
    ///
    /// ```
    /// use expfmt_core::accept::MediaRange;
    ///
    /// let range = MediaRange::parse("text/plain; version=0.0.4; q=0.3").unwrap();
    /// assert!(range.is_type("text", "plain"));
    /// assert_eq!(range.param("version"), Some("0.0.4"));
    /// assert_eq!(range.quality(), 0.3);
    ///
    /// assert!(MediaRange::parse("text").is_none());
    /// assert!(MediaRange::parse("text/plain;q=high").is_none());
    /// ```
    pub fn parse(segment: &str) -> Option<Self> {
        let mut pieces = segment.split(';');
        let range = pieces.next()?.trim();

        let (type_, subtype) = match range.split_once('/') {
            Some((t, s)) => (t.trim(), s.trim()),
            None if range == "*" => ("*", "*"),
            None => return None,
        };
        if type_.is_empty() || subtype.is_empty() || subtype.contains('/') {
            return None;
        }

        let specificity = match (type_, subtype) {
            ("*", "*") => Specificity::Wildcard,
            ("*", _) => return None,
            (_, "*") => Specificity::TypeWildcard,
            _ => Specificity::Exact,
        };

        let mut params: Vec<(String, String)> = Vec::new();
        let mut quality = 1.0_f32;

        for piece in pieces {
            let Some((name, value)) = piece.split_once('=') else {
                continue;
            };
            let name = name.trim();
            let value = unquote(value.trim());
            if name.is_empty() {
                continue;
            }
            if name == "q" {
                quality = parse_quality(value)?;
            }
            match params.iter_mut().find(|(n, _)| n.as_str() == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => params.push((name.to_string(), value.to_string())),
            }
        }

        Some(Self {
            type_: type_.to_string(),
            subtype: subtype.to_string(),
            params,
            quality,
            specificity,
        })
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// `type/subtype` without parameters.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.type_, self.subtype)
    }

    /// Exact, case-sensitive comparison of type and subtype.
    pub fn is_type(&self, type_: &str, subtype: &str) -> bool {
        self.type_ == type_ && self.subtype == subtype
    }

    /// Value of a parameter by case-sensitive name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }
}

/// Parses a full Accept header into media ranges, most preferred first.
///
/// Ranges are ordered by quality weight, then by specificity, then by their
/// position in the header.
///
/// ```
/// use expfmt_core::accept::parse_accept;
///
/// let ranges = parse_accept("text/html;q=0.8, application/json, */*;q=0.1");
/// assert_eq!(ranges.len(), 3);
/// assert_eq!(ranges[0].subtype(), "json");
/// assert_eq!(ranges[2].type_(), "*");
///
/// assert!(parse_accept("").is_empty());
/// ```
pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    let mut ranges: Vec<MediaRange> = header
        .split(',')
        .filter_map(|segment| {
            let segment = segment.trim();
            if segment.is_empty() {
                return None;
            }
            let parsed = MediaRange::parse(segment);
            if parsed.is_none() {
                trace!(segment, "Skipping malformed Accept segment");
            }
            parsed
        })
        .collect();

    // `sort_by` is stable: equal keys keep header order.
    ranges.sort_by(|a, b| {
        b.quality
            .total_cmp(&a.quality)
            .then_with(|| b.specificity.cmp(&a.specificity))
    });

    ranges
}

fn parse_quality(raw: &str) -> Option<f32> {
    let q: f32 = raw.parse().ok()?;
    // `abs` folds -0 into 0 so both tie on rank.
    (q.is_finite() && (0.0..=1.0).contains(&q)).then_some(q.abs())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
