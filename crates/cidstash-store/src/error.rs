use std::fmt;

use cidstash_types::{Identifier, Mode, TypeError};

/// Errors from store, outcome, and coordinator operations.
///
/// A lookup miss is not an error: it is reported as a non-`ok`
/// [`Outcome`](crate::Outcome). The variants here are faults.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Identifier parsing or codec failure.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// A content accessor was called on an outcome of the other mode.
    #[error("cannot request {accessor}() for a {mode} identifier")]
    WrongMode { accessor: &'static str, mode: Mode },

    /// A content accessor was called on an outcome with no payload.
    #[error("cannot get {accessor}() from empty outcome for {identifier}")]
    Empty {
        accessor: &'static str,
        identifier: Identifier,
    },

    /// The coordinator has no backend configured.
    #[error("no storage backend configured")]
    NoBackend,

    /// A backend or observer failed to initialize.
    #[error("lifecycle failure: {0}")]
    Lifecycle(LifecycleFailure),

    /// One or more participants failed to shut down. All participants were
    /// still given the chance to shut down.
    #[error("{} participant(s) failed to shut down", .0.len())]
    Shutdown(Vec<LifecycleFailure>),

    /// I/O error while draining an input stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Lifecycle phase in which a participant failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Init,
    Shutdown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// A failed `init` or `shutdown` hook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LifecycleFailure {
    /// Name of the backend or observer.
    pub participant: String,
    pub phase: Phase,
    pub reason: String,
}

impl fmt::Display for LifecycleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed during {}: {}", self.participant, self.phase, self.reason)
    }
}
