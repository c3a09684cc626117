use thiserror::Error;

/// Errors produced by envelope decoding or payload (de)serialization.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CodecError {
    /// A length-prefixed field declared more bytes than remained in the buffer,
    /// or exceeded a sanity bound.
    #[error("invalid length prefix")]
    InvalidLength,

    /// A string field was not valid UTF-8.
    #[error("invalid utf-8 in wire field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// No serializer or envelope codec is registered under this tag.
    #[error("no codec registered for tag {0:?}")]
    UnknownTag(String),

    /// A tag was registered twice.
    #[error("codec tag {0:?} already registered")]
    DuplicateTag(String),

    /// The concrete serializer failed to encode a value.
    #[error("serialize failed: {0}")]
    Serialize(String),

    /// The concrete serializer failed to decode a value.
    #[error("deserialize failed: {0}")]
    Deserialize(String),
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, CodecError>;
