//! Foundation types for cidstash.
//!
//! Every payload in a cidstash store is named by an [`Identifier`]: a CIDv1
//! derived from the content itself. This crate provides the identifier type,
//! its two addressing [`Mode`]s, and the [`codec`] service that computes
//! identifiers and canonically encodes structured values.
//!
//! # Key Types
//!
//! - [`Identifier`] — content identifier with a cached canonical string
//! - [`Mode`] — raw bytes vs. DAG-CBOR structured data
//! - [`AsIdentifier`] — accepts an identifier or its canonical string

pub mod codec;
pub mod error;
pub mod identifier;
pub mod mode;

pub use error::{TypeError, TypeResult};
pub use identifier::{AsIdentifier, Identifier, LINK_KEY};
pub use ipld_core::ipld::Ipld;
pub use mode::{Mode, CODEC_DAG_CBOR, CODEC_RAW};
