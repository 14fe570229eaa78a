use crate::error::EncodeError;
use expfmt_core::format::ExpositionFormat;
use expfmt_core::negotiate::negotiate;
use prometheus::proto::MetricFamily;
use prometheus::{Encoder as _, TextEncoder};
use protobuf::Message;
use std::fmt;
use std::io::Write;

/// Encoding function bound to a format: writes one family to the sink.
type EncodeFn = fn(&mut dyn Write, &MetricFamily) -> Result<(), EncodeError>;

/// The format table. Every variant has exactly one encoding function.
fn encode_fn(format: ExpositionFormat) -> EncodeFn {
    match format {
        ExpositionFormat::Text => write_text,
        ExpositionFormat::ProtoDelimited => write_proto_delimited,
        ExpositionFormat::ProtoText => write_proto_text,
        ExpositionFormat::ProtoCompactText => write_proto_compact,
    }
}

fn write_text(mut w: &mut dyn Write, mf: &MetricFamily) -> Result<(), EncodeError> {
    TextEncoder::new().encode(std::slice::from_ref(mf), &mut w)?;
    Ok(())
}

fn write_proto_delimited(w: &mut dyn Write, mf: &MetricFamily) -> Result<(), EncodeError> {
    mf.write_length_delimited_to_writer(w)?;
    Ok(())
}

fn write_proto_text(w: &mut dyn Write, mf: &MetricFamily) -> Result<(), EncodeError> {
    // Generated messages format through `text_format`; `#` selects the
    // multi-line layout.
    writeln!(w, "{mf:#?}")?;
    Ok(())
}

fn write_proto_compact(w: &mut dyn Write, mf: &MetricFamily) -> Result<(), EncodeError> {
    writeln!(w, "{}", protobuf::text_format::print_to_string(mf))?;
    Ok(())
}

/// Something that accepts metric families one at a time.
pub trait MetricEncoder {
    fn encode(&mut self, family: &MetricFamily) -> Result<(), EncodeError>;
}

/// A sink bound to one exposition format.
///
/// Each [`encode`](Encoder::encode) call writes exactly one family and keeps
/// no state between calls; buffering, if any, belongs to the sink. Taking
/// `&mut self` means sharing one encoder across threads needs a lock around
/// it, same as sharing the sink would.
pub struct Encoder<W> {
    sink: W,
    format: ExpositionFormat,
    write: EncodeFn,
}

impl<W: Write> Encoder<W> {
    pub fn new(sink: W, format: ExpositionFormat) -> Self {
        Self {
            sink,
            format,
            write: encode_fn(format),
        }
    }

    /// Encode one metric family to the sink. Sink and serializer errors are
    /// returned as-is; nothing is retried.
    pub fn encode(&mut self, family: &MetricFamily) -> Result<(), EncodeError> {
        (self.write)(&mut self.sink, family)
    }

    pub fn format(&self) -> ExpositionFormat {
        self.format
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> MetricEncoder for Encoder<W> {
    fn encode(&mut self, family: &MetricFamily) -> Result<(), EncodeError> {
        Encoder::encode(self, family)
    }
}

impl<W> fmt::Debug for Encoder<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// Negotiates a format from an Accept header value and binds it to `sink`.
///
/// Returns the encoder together with the Content-Type to send back. Never
/// fails: unrecognised headers get the plain text format.
pub fn negotiate_encoder<W: Write>(sink: W, accept: &str) -> (Encoder<W>, &'static str) {
    let format = negotiate(accept);
    (Encoder::new(sink, format), format.content_type())
}

/// Encodes each family in order, stopping at the first error.
pub fn encode_all<E>(encoder: &mut E, families: &[MetricFamily]) -> Result<(), EncodeError>
where
    E: MetricEncoder + ?Sized,
{
    for family in families {
        encoder.encode(family)?;
    }
    Ok(())
}
