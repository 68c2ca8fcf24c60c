use crate::domain::notification::Notification;
use crate::domain::ports::MailTransportBox;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Hands notifications to a background worker that owns the mail transport.
///
/// `notify` never blocks and never fails from the caller's point of view: a
/// full queue or a stopped worker is logged and the message dropped.
#[derive(Clone)]
pub struct NotificationSender {
    tx: mpsc::Sender<Notification>,
}

impl NotificationSender {
    /// Spawns the delivery worker on the current tokio runtime.
    ///
    /// The worker exits once every `NotificationSender` clone is dropped and
    /// the queue has drained; the returned handle resolves to the number of
    /// messages delivered successfully.
    pub fn spawn(transport: MailTransportBox, capacity: usize) -> (Self, JoinHandle<usize>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(deliver(transport, rx));
        (Self { tx }, handle)
    }

    pub fn notify(&self, notification: Notification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(n)) => {
                warn!(to = %n.recipient(), "Notification queue full, dropping message");
            }
            Err(TrySendError::Closed(n)) => {
                error!(to = %n.recipient(), "Notification worker stopped, dropping message");
            }
        }
    }
}

async fn deliver(transport: MailTransportBox, mut rx: mpsc::Receiver<Notification>) -> usize {
    let mut delivered = 0;
    while let Some(notification) = rx.recv().await {
        let email = notification.render();
        match transport.send(&email).await {
            Ok(message_id) => {
                delivered += 1;
                info!(to = %email.to, message_id = %message_id, "Notification delivered");
            }
            Err(e) => {
                error!(to = %email.to, subject = %email.subject, error = %e, "Notification failed");
            }
        }
    }
    debug!(delivered, "Notification worker stopped");
    delivered
}
