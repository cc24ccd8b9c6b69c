use thiserror::Error;

/// Errors produced by identifier and codec operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("malformed identifier {input:?}: {reason}")]
    MalformedIdentifier { input: String, reason: String },

    #[error("unsupported multicodec 0x{0:x}")]
    UnsupportedCodec(u64),

    #[error("unsupported CID version {0}")]
    UnsupportedVersion(u64),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("digest error: {0}")]
    Digest(String),
}

/// Result alias for identifier and codec operations.
pub type TypeResult<T> = Result<T, TypeError>;
