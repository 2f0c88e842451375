use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::email::EmailSender;
use crate::error::NotificationError;
use crate::sms::SmsSender;
use crate::templates::EmailContent;

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Email {
        to: String,
        subject: String,
        html: String,
    },
    Sms {
        to: String,
        body: String,
    },
}

impl Notification {
    pub fn email(to: impl Into<String>, content: EmailContent) -> Self {
        Notification::Email {
            to: to.into(),
            subject: content.subject,
            html: content.html,
        }
    }

    pub fn sms(to: impl Into<String>, body: impl Into<String>) -> Self {
        Notification::Sms {
            to: to.into(),
            body: body.into(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Notification::Email { .. } => "email",
            Notification::Sms { .. } => "sms",
        }
    }
}

/// Notifications waiting for the worker before `dispatch` starts refusing them.
pub const QUEUE_CAPACITY: usize = 1024;
/// Deliveries allowed in flight at once.
pub const MAX_IN_FLIGHT: usize = 16;
/// Upper bound on a single delivery, transport call included.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(15);

/// Handle to the background delivery worker. Cloning is cheap; every clone
/// feeds the same queue.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<Notification>,
}

impl NotificationDispatcher {
    /// Spawns the delivery worker on the current runtime. The worker exits
    /// once every dispatcher handle has been dropped.
    pub fn spawn(
        email: Arc<dyn EmailSender>,
        sms: Arc<dyn SmsSender>,
    ) -> (Self, JoinHandle<()>) {
        Self::spawn_with_timeout(email, sms, DELIVERY_TIMEOUT)
    }

    pub fn spawn_with_timeout(
        email: Arc<dyn EmailSender>,
        sms: Arc<dyn SmsSender>,
        delivery_timeout: Duration,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let handle = tokio::spawn(run_worker(rx, email, sms, delivery_timeout));
        (Self { tx }, handle)
    }

    /// Queues a notification without waiting. Fails only when the worker has
    /// gone away or the queue is full; callers treat that as a warning, never
    /// as a request failure.
    pub fn dispatch(&self, notification: Notification) -> Result<(), NotificationError> {
        debug!("Queueing {} notification", notification.kind());
        self.tx.try_send(notification).map_err(|err| match err {
            TrySendError::Full(n) => {
                warn!("Dropping {} notification: queue is full", n.kind());
                NotificationError::QueueFull
            }
            TrySendError::Closed(n) => {
                warn!("Dropping {} notification: worker is not running", n.kind());
                NotificationError::QueueClosed
            }
        })
    }

    /// Queues several notifications, reporting whether all of them were accepted.
    pub fn dispatch_all(
        &self,
        notifications: impl IntoIterator<Item = Notification>,
    ) -> Result<(), NotificationError> {
        let mut result = Ok(());
        for notification in notifications {
            if let Err(err) = self.dispatch(notification) {
                result = Err(err);
            }
        }
        result
    }
}

// Notifications are taken off the queue in order, each delivered on its own
// task so a stalled transport holds at most one permit until it times out.
async fn run_worker(
    mut rx: mpsc::Receiver<Notification>,
    email: Arc<dyn EmailSender>,
    sms: Arc<dyn SmsSender>,
    delivery_timeout: Duration,
) {
    info!("Notification worker started");
    let permits = Arc::new(Semaphore::new(MAX_IN_FLIGHT));

    while let Some(notification) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let email = email.clone();
        let sms = sms.clone();

        tokio::spawn(async move {
            let kind = notification.kind();
            let delivery = deliver(notification, email.as_ref(), sms.as_ref());
            if timeout(delivery_timeout, delivery).await.is_err() {
                warn!("{} delivery timed out after {:?}, dropped", kind, delivery_timeout);
            }
            drop(permit);
        });
    }

    info!("Notification worker stopped");
}

async fn deliver(notification: Notification, email: &dyn EmailSender, sms: &dyn SmsSender) {
    match notification {
        Notification::Email { to, subject, html } => {
            if let Err(err) = email.send_email(&to, &subject, &html).await {
                warn!("Email '{}' to {} not delivered: {}", subject, to, err);
            }
        }
        Notification::Sms { to, body } => {
            if let Err(err) = sms.send_sms(&to, &body).await {
                warn!("SMS to {} not delivered: {}", to, err);
            }
        }
    }
}
