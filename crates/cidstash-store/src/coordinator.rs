use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use cidstash_types::{codec, AsIdentifier, Identifier};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::config::{BackendConfig, StoreConfig};
use crate::error::{LifecycleFailure, Phase, StoreError, StoreResult};
use crate::input::RawInput;
use crate::memory::MemoryBackend;
use crate::observer::{ChannelObserver, Observer, TracingObserver};
use crate::outcome::{Operation, Outcome};

/// The façade applications talk to.
///
/// Composes at most one [`Backend`] with an ordered list of [`Observer`]s.
/// The coordinator holds no payloads: reads are pure delegation, writes and
/// deletes are delegated and then announced to every observer, in
/// registration order, before the call returns.
pub struct Coordinator {
    backend: Option<Box<dyn Backend>>,
    observers: Vec<Arc<dyn Observer>>,
}

impl Coordinator {
    /// A coordinator with no backend and no observers.
    pub fn new() -> Self {
        Self {
            backend: None,
            observers: Vec::new(),
        }
    }

    /// Set the backend, replacing any previous one.
    pub fn with_backend(mut self, backend: impl Backend + 'static) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    /// Append an observer.
    pub fn with_observer(self, observer: impl Observer + 'static) -> Self {
        self.with_shared_observer(Arc::new(observer))
    }

    /// Append an observer the caller keeps a handle to.
    pub fn with_shared_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Build a coordinator from configuration.
    ///
    /// When a notification channel is configured, its observer handle is
    /// returned so callers can subscribe.
    pub fn from_config(config: &StoreConfig) -> StoreResult<(Self, Option<ChannelObserver>)> {
        config.validate()?;
        let mut coordinator = Self::new();
        match config.backend {
            BackendConfig::Memory => coordinator = coordinator.with_backend(MemoryBackend::new()),
            BackendConfig::Disabled => {}
        }
        if config.observers.tracing {
            coordinator = coordinator.with_observer(TracingObserver);
        }
        let channel = config.observers.channel_capacity.map(|capacity| {
            let (observer, _initial) = ChannelObserver::new(capacity);
            observer
        });
        if let Some(observer) = &channel {
            coordinator = coordinator.with_observer(observer.clone());
        }
        Ok((coordinator, channel))
    }

    /// The configured backend.
    pub fn backend(&self) -> StoreResult<&dyn Backend> {
        self.backend.as_deref().ok_or(StoreError::NoBackend)
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Initialize the backend and every observer concurrently.
    ///
    /// All hooks run to completion; the first failure in registration order
    /// (backend first) is returned. Participants that did initialize are left
    /// as they are.
    pub async fn init(&self) -> StoreResult<()> {
        let failures = self.run_lifecycle(Phase::Init).await;
        match failures.into_iter().next() {
            Some(failure) => Err(StoreError::Lifecycle(failure)),
            None => {
                info!(observers = self.observers.len(), "coordinator initialized");
                Ok(())
            }
        }
    }

    /// Shut down the backend and every observer concurrently.
    ///
    /// A failing participant never prevents the others from shutting down;
    /// all failures are collected into [`StoreError::Shutdown`].
    pub async fn shutdown(&self) -> StoreResult<()> {
        let failures = self.run_lifecycle(Phase::Shutdown).await;
        if failures.is_empty() {
            info!("coordinator shut down");
            Ok(())
        } else {
            Err(StoreError::Shutdown(failures))
        }
    }

    /// Store raw content, then notify `put`.
    pub async fn put_raw<'a>(&self, raw: impl Into<RawInput<'a>>) -> StoreResult<Identifier> {
        let id = self.backend()?.put_raw(raw.into()).await?;
        debug!(id = %id, "stored raw content");
        self.fan_out(Operation::Put, &id);
        Ok(id)
    }

    /// Store a structured value, then notify `put`.
    pub async fn put_data<T: Serialize + ?Sized>(&self, value: &T) -> StoreResult<Identifier> {
        let backend = self.backend()?;
        let value = codec::to_ipld(value)?;
        let id = backend.put_data(&value).await?;
        debug!(id = %id, "stored structured content");
        self.fan_out(Operation::Put, &id);
        Ok(id)
    }

    /// Look up content. A miss is a non-`ok` outcome.
    pub async fn get<I: AsIdentifier>(&self, id: I) -> StoreResult<Outcome> {
        let id = id.as_identifier()?;
        self.backend()?.get(&id).await
    }

    /// Check whether content is held.
    pub async fn has<I: AsIdentifier>(&self, id: I) -> StoreResult<bool> {
        let id = id.as_identifier()?;
        self.backend()?.has(&id).await
    }

    /// Remove content, then notify `delete` whether or not it was held.
    pub async fn delete<I: AsIdentifier>(&self, id: I) -> StoreResult<Outcome> {
        let id = id.as_identifier()?;
        let outcome = self.backend()?.delete(&id).await?;
        debug!(id = %id, "deleted content");
        self.fan_out(Operation::Delete, &id);
        Ok(outcome)
    }

    fn fan_out(&self, operation: Operation, id: &Identifier) {
        for observer in &self.observers {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| observer.notify(operation, id)));
            if delivered.is_err() {
                warn!(observer = observer.name(), %operation, id = %id, "observer panicked in notify");
            }
        }
    }

    async fn run_lifecycle(&self, phase: Phase) -> Vec<LifecycleFailure> {
        let backend = async {
            let backend = self.backend.as_deref()?;
            let result = match phase {
                Phase::Init => backend.init(self).await,
                Phase::Shutdown => backend.shutdown(self).await,
            };
            result.err().map(|e| failure(backend.name(), phase, e))
        };
        let observers = join_all(self.observers.iter().map(|observer| async move {
            let result = match phase {
                Phase::Init => observer.init(self).await,
                Phase::Shutdown => observer.shutdown(self).await,
            };
            result.err().map(|e| failure(observer.name(), phase, e))
        }));

        let (backend, observers) = futures::join!(backend, observers);
        backend
            .into_iter()
            .chain(observers.into_iter().flatten())
            .collect()
    }
}

fn failure(participant: &str, phase: Phase, error: StoreError) -> LifecycleFailure {
    warn!(participant, %phase, error = %error, "lifecycle hook failed");
    LifecycleFailure {
        participant: participant.to_string(),
        phase,
        reason: error.to_string(),
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let observers: Vec<&str> = self.observers.iter().map(|o| o.name()).collect();
        f.debug_struct("Coordinator")
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .field("observers", &observers)
            .finish()
    }
}
