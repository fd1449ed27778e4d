use shared::protocol::{Notification, NotificationKind};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Receives user-visible toasts. Fire-and-forget: nothing comes back.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => info!(message = %notification.message, "notify success"),
            NotificationKind::Failure => warn!(message = %notification.message, "notify failure"),
        }
    }
}

/// Fans notifications out to any number of UI subscribers.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl NotificationSink for BroadcastNotifier {
    fn notify(&self, notification: Notification) {
        // no subscribers is fine
        let _ = self.tx.send(notification);
    }
}
