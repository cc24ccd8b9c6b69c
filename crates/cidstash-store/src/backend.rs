use async_trait::async_trait;
use cidstash_types::{Identifier, Ipld};

use crate::coordinator::Coordinator;
use crate::error::StoreResult;
use crate::input::RawInput;
use crate::outcome::Outcome;

/// Content-addressed storage backend.
///
/// All implementations must satisfy these invariants:
/// - Identifiers are computed by the codec service, never chosen by callers.
///   Raw and structured content use different codecs, so the same bytes in
///   both modes never share an identifier.
/// - At most one payload is held per identifier, and `has` reports exactly
///   whether it is held.
/// - `get` reports a miss as a non-`ok` outcome, not as an error.
/// - `delete` is idempotent and always returns an `ok` outcome.
/// - Payloads are never aliased with caller memory.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Name used in logs and lifecycle reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Prepare backend state. A failure here aborts [`Coordinator::init`].
    async fn init(&self, _coordinator: &Coordinator) -> StoreResult<()> {
        Ok(())
    }

    /// Release backend state. Best effort.
    async fn shutdown(&self, _coordinator: &Coordinator) -> StoreResult<()> {
        Ok(())
    }

    /// Store raw content and return its raw-mode identifier.
    async fn put_raw(&self, raw: RawInput<'_>) -> StoreResult<Identifier>;

    /// Canonically encode and store a structured value, returning its
    /// structured-mode identifier.
    async fn put_data(&self, value: &Ipld) -> StoreResult<Identifier>;

    /// Look up a payload. The payload is attached to the outcome undecoded.
    async fn get(&self, id: &Identifier) -> StoreResult<Outcome>;

    /// Check whether a payload is held.
    async fn has(&self, id: &Identifier) -> StoreResult<bool>;

    /// Remove a payload if present.
    async fn delete(&self, id: &Identifier) -> StoreResult<Outcome>;
}
