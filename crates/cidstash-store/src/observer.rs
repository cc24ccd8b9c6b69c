use async_trait::async_trait;
use cidstash_types::Identifier;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::coordinator::Coordinator;
use crate::error::StoreResult;
use crate::outcome::Operation;

/// Notification sink informed of successful writes and deletes.
///
/// `notify` runs on the caller's write path, after the backend effect and
/// before the coordinator returns. It must return promptly: anything slow
/// belongs on a task or channel the observer owns.
#[async_trait]
pub trait Observer: Send + Sync {
    /// Name used in logs and lifecycle reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    async fn init(&self, _coordinator: &Coordinator) -> StoreResult<()> {
        Ok(())
    }

    async fn shutdown(&self, _coordinator: &Coordinator) -> StoreResult<()> {
        Ok(())
    }

    fn notify(&self, operation: Operation, identifier: &Identifier);
}

/// A single write or delete event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub operation: Operation,
    pub identifier: Identifier,
}

/// Logs every notification through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

#[async_trait]
impl Observer for TracingObserver {
    fn name(&self) -> &'static str {
        "tracing"
    }

    async fn init(&self, _coordinator: &Coordinator) -> StoreResult<()> {
        debug!("tracing observer attached");
        Ok(())
    }

    fn notify(&self, operation: Operation, identifier: &Identifier) {
        info!(%operation, id = %identifier, mode = %identifier.mode(), "content changed");
    }
}

/// Forwards notifications to async consumers over a broadcast channel.
///
/// Sending never blocks. Receivers that fall behind observe
/// `RecvError::Lagged`; events sent while nobody listens are dropped.
#[derive(Clone, Debug)]
pub struct ChannelObserver {
    sender: broadcast::Sender<Notification>,
}

impl ChannelObserver {
    /// Create an observer and a first receiver.
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<Notification>) {
        let (sender, receiver) = broadcast::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Add another receiver. It sees events sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl Observer for ChannelObserver {
    fn name(&self) -> &'static str {
        "channel"
    }

    fn notify(&self, operation: Operation, identifier: &Identifier) {
        let event = Notification {
            operation,
            identifier: identifier.clone(),
        };
        if self.sender.send(event).is_err() {
            debug!(%operation, id = %identifier, "no channel receivers, notification dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cidstash_types::{codec, Mode};

    fn id(data: &[u8]) -> Identifier {
        codec::compute_identifier(Mode::Raw, data).unwrap()
    }

    #[tokio::test]
    async fn channel_delivers_in_order() {
        let (observer, mut rx) = ChannelObserver::new(8);
        observer.notify(Operation::Put, &id(b"a"));
        observer.notify(Operation::Delete, &id(b"a"));

        let first = rx.recv().await.unwrap();
        assert_eq!(first, Notification { operation: Operation::Put, identifier: id(b"a") });
        let second = rx.recv().await.unwrap();
        assert_eq!(second.operation, Operation::Delete);
    }

    #[tokio::test]
    async fn channel_fans_out_to_subscribers() {
        let (observer, mut first) = ChannelObserver::new(8);
        let mut second = observer.subscribe();
        assert_eq!(observer.receiver_count(), 2);

        observer.notify(Operation::Put, &id(b"b"));
        assert_eq!(first.recv().await.unwrap().identifier, id(b"b"));
        assert_eq!(second.recv().await.unwrap().identifier, id(b"b"));
    }

    #[test]
    fn channel_without_receivers_does_not_panic() {
        let (observer, rx) = ChannelObserver::new(1);
        drop(rx);
        observer.notify(Operation::Put, &id(b"c"));
        assert_eq!(observer.receiver_count(), 0);
    }

    #[tokio::test]
    async fn slow_receiver_lags_without_blocking() {
        let (observer, mut rx) = ChannelObserver::new(2);
        for i in 0..5u8 {
            observer.notify(Operation::Put, &id(&[i]));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
    }

    #[test]
    fn tracing_observer_notifies() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        TracingObserver.notify(Operation::Put, &id(b"logged"));
        assert_eq!(TracingObserver.name(), "tracing");
    }
}
