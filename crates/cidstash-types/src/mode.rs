use std::fmt;

use serde::{Deserialize, Serialize};

/// Multicodec code for raw bytes.
pub const CODEC_RAW: u64 = 0x55;

/// Multicodec code for DAG-CBOR.
pub const CODEC_DAG_CBOR: u64 = 0x71;

/// Addressing mode of a content identifier.
///
/// The mode is carried in the identifier's multicodec, so the same bytes
/// stored once as raw and once as structured data never share an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Opaque bytes, addressed as submitted.
    Raw,
    /// A structured value, addressed by its canonical DAG-CBOR encoding.
    Structured,
}

impl Mode {
    /// The multicodec code identifying this mode inside a CID.
    pub const fn codec(self) -> u64 {
        match self {
            Self::Raw => CODEC_RAW,
            Self::Structured => CODEC_DAG_CBOR,
        }
    }

    /// Map a multicodec code back to a mode.
    pub const fn from_codec(codec: u64) -> Option<Self> {
        match codec {
            CODEC_RAW => Some(Self::Raw),
            CODEC_DAG_CBOR => Some(Self::Structured),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::Structured => write!(f, "structured"),
        }
    }
}
