use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Raw content submitted to [`Backend::put_raw`](crate::Backend::put_raw).
///
/// Borrowed slices are copied before storage so the caller may reuse its
/// buffer as soon as the call returns. Streams are drained completely before
/// hashing, since the digest needs the whole content.
pub enum RawInput<'a> {
    /// A caller-owned buffer.
    Borrowed(&'a [u8]),
    /// A buffer whose ownership moves into the store.
    Owned(Bytes),
    /// A readable stream.
    Stream(Pin<Box<dyn AsyncRead + Send + 'a>>),
}

impl<'a> RawInput<'a> {
    /// Wrap any async reader.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'a,
    {
        Self::Stream(Box::pin(reader))
    }

    /// Materialize the content as an owned buffer.
    pub async fn into_bytes(self) -> std::io::Result<Bytes> {
        match self {
            Self::Borrowed(slice) => Ok(Bytes::copy_from_slice(slice)),
            Self::Owned(bytes) => Ok(bytes),
            Self::Stream(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).await?;
                Ok(Bytes::from(buf))
            }
        }
    }
}

impl<'a> From<&'a [u8]> for RawInput<'a> {
    fn from(slice: &'a [u8]) -> Self {
        Self::Borrowed(slice)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for RawInput<'a> {
    fn from(array: &'a [u8; N]) -> Self {
        Self::Borrowed(array.as_slice())
    }
}

impl<'a> From<&'a Vec<u8>> for RawInput<'a> {
    fn from(vec: &'a Vec<u8>) -> Self {
        Self::Borrowed(vec.as_slice())
    }
}

impl From<Vec<u8>> for RawInput<'_> {
    fn from(vec: Vec<u8>) -> Self {
        Self::Owned(Bytes::from(vec))
    }
}

impl From<Bytes> for RawInput<'_> {
    fn from(bytes: Bytes) -> Self {
        Self::Owned(bytes)
    }
}

impl fmt::Debug for RawInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Borrowed(slice) => write!(f, "RawInput::Borrowed({} bytes)", slice.len()),
            Self::Owned(bytes) => write!(f, "RawInput::Owned({} bytes)", bytes.len()),
            Self::Stream(_) => write!(f, "RawInput::Stream"),
        }
    }
}
