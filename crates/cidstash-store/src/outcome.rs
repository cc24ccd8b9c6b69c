use std::fmt;
use std::io::Cursor;

use bytes::Bytes;
use cidstash_types::{codec, Identifier, Mode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Error message carried by an outcome for a lookup miss.
pub const NOT_FOUND: &str = "Not found";

/// The store operation that produced an [`Outcome`] or a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Put,
    Get,
    Has,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Put => write!(f, "put"),
            Self::Get => write!(f, "get"),
            Self::Has => write!(f, "has"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A one-shot stream over an outcome's raw payload.
pub type ByteStream = Cursor<Bytes>;

/// Result of a store operation.
///
/// `ok` is true exactly when no error is set. The content accessors are lazy:
/// a payload is only decoded when asked for, and asking for the wrong mode or
/// for an absent payload is a fault.
#[derive(Clone)]
pub struct Outcome {
    identifier: Identifier,
    operation: Operation,
    error: Option<String>,
    payload: Option<Bytes>,
}

impl Outcome {
    pub fn new(identifier: Identifier, operation: Operation, error: Option<String>) -> Self {
        Self {
            identifier,
            operation,
            error,
            payload: None,
        }
    }

    /// A successful outcome with no payload.
    pub fn success(identifier: Identifier, operation: Operation) -> Self {
        Self::new(identifier, operation, None)
    }

    /// A failed `get` for an identifier the backend does not hold.
    pub fn not_found(identifier: Identifier) -> Self {
        Self::new(identifier, Operation::Get, Some(NOT_FOUND.to_string()))
    }

    /// Attach the stored payload. Backends call this before returning.
    pub fn with_payload(mut self, payload: Bytes) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn is_raw(&self) -> bool {
        self.identifier.is_raw()
    }

    pub fn is_structured(&self) -> bool {
        self.identifier.is_structured()
    }

    /// Whether a payload is attached.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Decode the structured payload.
    ///
    /// Use `T = Ipld` for the generic data model.
    pub fn structured_value<T: DeserializeOwned>(&self) -> StoreResult<T> {
        let payload = self.payload_for("structured_value", Mode::Structured)?;
        Ok(codec::decode(payload)?)
    }

    /// The raw payload as a byte buffer. Cloning is cheap.
    pub fn raw_bytes(&self) -> StoreResult<Bytes> {
        self.payload_for("raw_bytes", Mode::Raw).cloned()
    }

    /// The raw payload as a one-shot async stream.
    pub fn byte_stream(&self) -> StoreResult<ByteStream> {
        let payload = self.payload_for("byte_stream", Mode::Raw)?;
        Ok(Cursor::new(payload.clone()))
    }

    fn payload_for(&self, accessor: &'static str, expected: Mode) -> StoreResult<&Bytes> {
        if self.identifier.mode() != expected {
            return Err(StoreError::WrongMode {
                accessor,
                mode: self.identifier.mode(),
            });
        }
        self.payload.as_ref().ok_or_else(|| StoreError::Empty {
            accessor,
            identifier: self.identifier.clone(),
        })
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("ok", &self.ok())
            .field("operation", &self.operation)
            .field("identifier", &self.identifier)
            .field("error", &self.error)
            .field("payload_len", &self.payload.as_ref().map(Bytes::len))
            .finish()
    }
}
