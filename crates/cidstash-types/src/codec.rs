//! The codec service: identifier computation and canonical structured
//! encoding.
//!
//! Identifiers are CIDv1 with a SHA2-256 multihash. Structured values are
//! encoded as DAG-CBOR, whose canonical form (sorted map keys, minimal
//! integers, tag 42 links) makes equal values produce equal bytes.

use ipld_core::cid::multihash::Multihash;
use ipld_core::cid::Cid;
use ipld_core::ipld::Ipld;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{TypeError, TypeResult};
use crate::identifier::Identifier;
use crate::mode::Mode;

/// Multihash code for SHA2-256.
pub const SHA2_256: u64 = 0x12;

/// Compute the identifier of `bytes` in the given mode.
///
/// For [`Mode::Structured`] the bytes must already be the canonical encoding;
/// use [`identify_value`] to encode and identify in one step.
pub fn compute_identifier(mode: Mode, bytes: &[u8]) -> TypeResult<Identifier> {
    let digest = Sha256::digest(bytes);
    let hash = Multihash::<64>::wrap(SHA2_256, digest.as_slice())
        .map_err(|e| TypeError::Digest(e.to_string()))?;
    Identifier::from_cid(Cid::new_v1(mode.codec(), hash))
}

/// Canonically encode a structured value.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> TypeResult<Vec<u8>> {
    serde_ipld_dagcbor::to_vec(value).map_err(|e| TypeError::Encode(e.to_string()))
}

/// Decode canonical bytes into a structured value.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> TypeResult<T> {
    serde_ipld_dagcbor::from_slice(bytes).map_err(|e| TypeError::Decode(e.to_string()))
}

/// Normalize any serializable value into the generic [`Ipld`] data model.
///
/// Goes through the canonical encoding so embedded identifiers become real
/// links rather than maps.
pub fn to_ipld<T: Serialize + ?Sized>(value: &T) -> TypeResult<Ipld> {
    decode(&encode(value)?)
}

/// Encode a value and compute its structured-mode identifier.
///
/// Returns the identifier together with the encoded bytes that it names.
pub fn identify_value<T: Serialize + ?Sized>(value: &T) -> TypeResult<(Identifier, Vec<u8>)> {
    let bytes = encode(value)?;
    let id = compute_identifier(Mode::Structured, &bytes)?;
    Ok((id, bytes))
}

/// Verify that `bytes` are named by `id`.
pub fn verify(id: &Identifier, bytes: &[u8]) -> bool {
    compute_identifier(id.mode(), bytes).is_ok_and(|computed| computed == *id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Pet {
        name: String,
        age: u64,
        friends: Vec<String>,
    }

    fn kitsune() -> Pet {
        Pet {
            name: "Kitsune".into(),
            age: 4,
            friends: vec!["Noodle".into(), "Bouboule".into()],
        }
    }

    #[test]
    fn known_raw_vector() {
        let id = compute_identifier(Mode::Raw, b"hello world").unwrap();
        assert_eq!(
            id.as_str(),
            "bafkreifzjut3te2nhyekklss27nh3k72ysco7y32koao5eei66wof36n5e"
        );
    }

    #[test]
    fn empty_raw_vector() {
        let id = compute_identifier(Mode::Raw, b"").unwrap();
        assert_eq!(
            id.as_str(),
            "bafkreihdwdcefgh4dqkjv67uzcmw7ojee6xedzdetojuzjevtenxquvyku"
        );
    }

    #[test]
    fn known_structured_vector() {
        let (id, bytes) = identify_value(&kitsune()).unwrap();
        assert_eq!(
            id.as_str(),
            "bafyreieoixmlaun3q36lsmrwlr7uu7xxveocv7hs77rfdmmnp5gkldrlz4"
        );
        // Map keys sorted by length, then bytewise: age, name, friends.
        assert_eq!(
            hex::encode(&bytes),
            "a36361676504646e616d65674b697473756e6567667269656e647382664e6f6f646c6568426f75626f756c65"
        );
    }

    #[test]
    fn field_order_does_not_matter() {
        let mut map = BTreeMap::new();
        map.insert("friends", Ipld::List(vec![
            Ipld::String("Noodle".into()),
            Ipld::String("Bouboule".into()),
        ]));
        map.insert("age", Ipld::Integer(4));
        map.insert("name", Ipld::String("Kitsune".into()));
        let (from_map, _) = identify_value(&map).unwrap();
        let (from_struct, _) = identify_value(&kitsune()).unwrap();
        assert_eq!(from_map, from_struct);
    }

    #[test]
    fn decode_roundtrip() {
        let bytes = encode(&kitsune()).unwrap();
        let back: Pet = decode(&bytes).unwrap();
        assert_eq!(back, kitsune());
    }

    #[test]
    fn decode_garbage_fails() {
        let err = decode::<Pet>(&[0xff, 0x00]).unwrap_err();
        assert!(matches!(err, TypeError::Decode(_)));
    }

    #[test]
    fn same_bytes_differ_by_mode() {
        let bytes = encode(&kitsune()).unwrap();
        let raw = compute_identifier(Mode::Raw, &bytes).unwrap();
        let structured = compute_identifier(Mode::Structured, &bytes).unwrap();
        assert_ne!(raw, structured);
        assert_eq!(raw.digest(), structured.digest());
    }

    #[test]
    fn verify_detects_tampering() {
        let id = compute_identifier(Mode::Raw, b"original").unwrap();
        assert!(verify(&id, b"original"));
        assert!(!verify(&id, b"tampered"));
    }

    #[test]
    fn embedded_identifier_becomes_link() {
        let target = compute_identifier(Mode::Raw, b"target").unwrap();
        let mut record = BTreeMap::new();
        record.insert("ref", target.clone());
        let ipld = to_ipld(&record).unwrap();
        match ipld {
            Ipld::Map(map) => assert_eq!(map.get("ref"), Some(&Ipld::Link(*target.cid()))),
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn embedded_identifier_roundtrips() {
        let target = compute_identifier(Mode::Raw, b"target").unwrap();
        let mut record = BTreeMap::new();
        record.insert("ref".to_string(), target.clone());
        let bytes = encode(&record).unwrap();
        let back: BTreeMap<String, Identifier> = decode(&bytes).unwrap();
        assert_eq!(back.get("ref"), Some(&target));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn raw_identifier_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..512)) {
                let a = compute_identifier(Mode::Raw, &data).unwrap();
                let b = compute_identifier(Mode::Raw, &data).unwrap();
                prop_assert_eq!(a, b);
            }

            #[test]
            fn modes_never_collide(data in proptest::collection::vec(any::<u8>(), 0..512)) {
                let raw = compute_identifier(Mode::Raw, &data).unwrap();
                let structured = compute_identifier(Mode::Structured, &data).unwrap();
                prop_assert_ne!(raw, structured);
            }

            #[test]
            fn parse_display_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..64)) {
                let id = compute_identifier(Mode::Raw, &data).unwrap();
                let parsed = Identifier::parse(id.as_str()).unwrap();
                prop_assert_eq!(parsed, id);
            }
        }
    }
}
