use thiserror::Error;

/// Failure of a single `encode` call, passed through from the sink or the
/// underlying serializer without reinterpretation.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Text(#[from] prometheus::Error),

    #[error(transparent)]
    Protobuf(#[from] protobuf::ProtobufError),
}

impl EncodeError {
    /// Short label for logs and error counters.
    pub fn kind(&self) -> &'static str {
        match self {
            EncodeError::Io(_) => "io",
            EncodeError::Text(_) => "text",
            EncodeError::Protobuf(_) => "protobuf",
        }
    }
}
