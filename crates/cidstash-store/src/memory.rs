use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use cidstash_types::{codec, Identifier, Ipld, Mode};
use tracing::debug;

use crate::backend::Backend;
use crate::coordinator::Coordinator;
use crate::error::StoreResult;
use crate::input::RawInput;
use crate::outcome::{Operation, Outcome};

/// In-memory, HashMap-based backend.
///
/// Intended for tests and embedding. Payloads are keyed by canonical
/// identifier string and live only as long as the instance; every instance
/// is independent. `init` and `shutdown` both reset the store to empty.
pub struct MemoryBackend {
    payloads: RwLock<HashMap<String, Bytes>>,
}

impl MemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            payloads: RwLock::new(HashMap::new()),
        }
    }

    /// Number of payloads currently held.
    pub fn len(&self) -> usize {
        self.payloads.read().expect("lock poisoned").len()
    }

    /// Returns `true` if nothing is held.
    pub fn is_empty(&self) -> bool {
        self.payloads.read().expect("lock poisoned").is_empty()
    }

    /// Total payload bytes held.
    pub fn total_bytes(&self) -> u64 {
        self.payloads
            .read()
            .expect("lock poisoned")
            .values()
            .map(|payload| payload.len() as u64)
            .sum()
    }

    /// Remove every payload.
    pub fn clear(&self) {
        self.payloads.write().expect("lock poisoned").clear();
    }

    /// Sorted canonical strings of every held identifier.
    pub fn identifiers(&self) -> Vec<String> {
        let map = self.payloads.read().expect("lock poisoned");
        let mut ids: Vec<String> = map.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn store(&self, id: &Identifier, payload: Bytes) {
        let mut map = self.payloads.write().expect("lock poisoned");
        // Same identifier, same content: keep the first copy.
        map.entry(id.as_str().to_string()).or_insert(payload);
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "MemoryBackend"
    }

    async fn init(&self, _coordinator: &Coordinator) -> StoreResult<()> {
        self.clear();
        Ok(())
    }

    async fn shutdown(&self, _coordinator: &Coordinator) -> StoreResult<()> {
        let dropped = self.len();
        self.clear();
        debug!(dropped, "memory backend released");
        Ok(())
    }

    async fn put_raw(&self, raw: RawInput<'_>) -> StoreResult<Identifier> {
        let bytes = raw.into_bytes().await?;
        let id = codec::compute_identifier(Mode::Raw, &bytes)?;
        self.store(&id, bytes);
        Ok(id)
    }

    async fn put_data(&self, value: &Ipld) -> StoreResult<Identifier> {
        let (id, bytes) = codec::identify_value(value)?;
        self.store(&id, Bytes::from(bytes));
        Ok(id)
    }

    async fn get(&self, id: &Identifier) -> StoreResult<Outcome> {
        let payload = self
            .payloads
            .read()
            .expect("lock poisoned")
            .get(id.as_str())
            .cloned();
        Ok(match payload {
            Some(payload) => Outcome::success(id.clone(), Operation::Get).with_payload(payload),
            None => Outcome::not_found(id.clone()),
        })
    }

    async fn has(&self, id: &Identifier) -> StoreResult<bool> {
        let map = self.payloads.read().expect("lock poisoned");
        Ok(map.contains_key(id.as_str()))
    }

    async fn delete(&self, id: &Identifier) -> StoreResult<Outcome> {
        let removed = self
            .payloads
            .write()
            .expect("lock poisoned")
            .remove(id.as_str())
            .is_some();
        if !removed {
            debug!(id = %id, "delete of absent payload");
        }
        Ok(Outcome::success(id.clone(), Operation::Delete))
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("payload_count", &self.len())
            .finish()
    }
}
