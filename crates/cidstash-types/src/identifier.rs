use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use ipld_core::cid::{Cid, Version};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};
use crate::mode::Mode;

/// Key used by the JSON link convention: `{"$link": "<cid>"}`.
pub const LINK_KEY: &str = "$link";

/// Content identifier (CIDv1) naming a stored payload.
///
/// An `Identifier` is derived from content by the codec service and is never
/// chosen by the caller. Equality, ordering and hashing are defined on the
/// canonical string, which is computed once at construction.
#[derive(Clone)]
pub struct Identifier {
    cid: Cid,
    mode: Mode,
    canonical: String,
}

impl Identifier {
    /// Every identifier produced or accepted here is a CIDv1.
    pub const VERSION: u64 = 1;

    /// Parse a canonical identifier string.
    ///
    /// Any multibase the CID library understands is accepted; the stored
    /// canonical form is always base32-lower.
    pub fn parse(input: &str) -> TypeResult<Self> {
        let malformed = |reason: String| TypeError::MalformedIdentifier {
            input: input.to_string(),
            reason,
        };
        let cid = Cid::try_from(input).map_err(|e| malformed(e.to_string()))?;
        Self::from_cid(cid).map_err(|e| malformed(e.to_string()))
    }

    /// Wrap a CID produced by the codec service.
    pub fn from_cid(cid: Cid) -> TypeResult<Self> {
        if cid.version() != Version::V1 {
            return Err(TypeError::UnsupportedVersion(u64::from(cid.version())));
        }
        let mode = Mode::from_codec(cid.codec()).ok_or(TypeError::UnsupportedCodec(cid.codec()))?;
        Ok(Self {
            canonical: cid.to_string(),
            cid,
            mode,
        })
    }

    /// The addressing mode encoded in this identifier.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_raw(&self) -> bool {
        self.mode == Mode::Raw
    }

    pub fn is_structured(&self) -> bool {
        self.mode == Mode::Structured
    }

    /// CID version. Always [`Identifier::VERSION`].
    pub fn version(&self) -> u64 {
        Self::VERSION
    }

    /// Multicodec code (0x55 for raw, 0x71 for DAG-CBOR).
    pub fn codec(&self) -> u64 {
        self.cid.codec()
    }

    /// The digest bytes of the multihash.
    pub fn digest(&self) -> &[u8] {
        self.cid.hash().digest()
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// The binary CID form.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cid.to_bytes()
    }

    /// The wrapped CID.
    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    /// Short hex of the digest (first 8 characters), for logs.
    pub fn short_hex(&self) -> String {
        let digest = self.digest();
        hex::encode(&digest[..digest.len().min(4)])
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Identifier {}

impl std::hash::Hash for Identifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(&self.canonical, state);
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({}:{})", self.mode, self.short_hex())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for Identifier {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = TypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<Cid> for Identifier {
    type Error = TypeError;

    fn try_from(cid: Cid) -> Result<Self, Self::Error> {
        Self::from_cid(cid)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

// Links are never rendered as plain strings. Human-readable formats get
// `{"$link": "..."}`; binary formats get the native CID (tag 42 in DAG-CBOR).
impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry(LINK_KEY, &self.canonical)?;
            map.end()
        } else {
            self.cid.serialize(serializer)
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonLink {
    #[serde(rename = "$link")]
    link: String,
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let JsonLink { link } = JsonLink::deserialize(deserializer)?;
            Self::parse(&link).map_err(de::Error::custom)
        } else {
            let cid = Cid::deserialize(deserializer)?;
            Self::from_cid(cid).map_err(de::Error::custom)
        }
    }
}

/// Anything that names an identifier: an [`Identifier`] or its canonical
/// string.
///
/// Strings are parsed on conversion, so a malformed string is rejected before
/// it reaches a backend.
pub trait AsIdentifier {
    fn as_identifier(&self) -> TypeResult<Cow<'_, Identifier>>;
}

impl AsIdentifier for Identifier {
    fn as_identifier(&self) -> TypeResult<Cow<'_, Identifier>> {
        Ok(Cow::Borrowed(self))
    }
}

impl AsIdentifier for str {
    fn as_identifier(&self) -> TypeResult<Cow<'_, Identifier>> {
        Identifier::parse(self).map(Cow::Owned)
    }
}

impl AsIdentifier for String {
    fn as_identifier(&self) -> TypeResult<Cow<'_, Identifier>> {
        self.as_str().as_identifier()
    }
}

impl<T: AsIdentifier + ?Sized> AsIdentifier for &T {
    fn as_identifier(&self) -> TypeResult<Cow<'_, Identifier>> {
        (**self).as_identifier()
    }
}
