//! Content-addressed storage for cidstash.
//!
//! Callers hand the [`Coordinator`] raw bytes or structured values and get
//! back an [`Identifier`] derived from the content. Retrieval, existence
//! checks and deletion are keyed by that identifier, never by a
//! caller-chosen name.
//!
//! # Extension Points
//!
//! - [`Backend`] — where payloads live. [`MemoryBackend`] is the reference
//!   implementation used for tests and embedding.
//! - [`Observer`] — told about every successful put and delete.
//!   [`TracingObserver`] and [`ChannelObserver`] are built in.
//!
//! # Design Rules
//!
//! 1. Identifiers are computed from content; raw and structured content use
//!    different codecs and never collide.
//! 2. A backend holds at most one payload per identifier.
//! 3. A lookup miss is an [`Outcome`] with `ok == false`, not an error.
//! 4. Misusing an outcome (wrong mode, no payload) is an error.
//! 5. Delete is idempotent and is always announced to observers.
//! 6. The coordinator never holds payloads.
//!
//! # Example
//!
//! ```
//! use cidstash_store::{Coordinator, MemoryBackend};
//!
//! # tokio_test_block_on(async {
//! let store = Coordinator::new().with_backend(MemoryBackend::new());
//! store.init().await.unwrap();
//! let id = store.put_raw(b"hello world").await.unwrap();
//! let outcome = store.get(&id).await.unwrap();
//! assert_eq!(&outcome.raw_bytes().unwrap()[..], b"hello world");
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod input;
pub mod memory;
pub mod observer;
pub mod outcome;

// Re-export primary types at crate root for ergonomic imports.
pub use backend::Backend;
pub use cidstash_types::{AsIdentifier, Identifier, Ipld, Mode};
pub use config::{BackendConfig, ObserverConfig, StoreConfig};
pub use coordinator::Coordinator;
pub use error::{LifecycleFailure, Phase, StoreError, StoreResult};
pub use input::RawInput;
pub use memory::MemoryBackend;
pub use observer::{ChannelObserver, Notification, Observer, TracingObserver};
pub use outcome::{ByteStream, Operation, Outcome, NOT_FOUND};
