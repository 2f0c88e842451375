// Notification gateway: best-effort email and SMS delivery. Nothing in here
// is allowed to fail a request; callers enqueue and move on.
pub mod dispatcher;
pub mod email;
pub mod error;
pub mod phone;
pub mod sms;
pub mod templates;

pub use dispatcher::{Notification, NotificationDispatcher};
pub use email::{EmailReceipt, EmailSender, MailRelayClient};
pub use error::NotificationError;
pub use phone::normalize_phone;
pub use sms::{SmsReceipt, SmsSender, TwilioClient};

use std::time::Duration;

use reqwest::Client;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client shared by the transports; every gateway call is time-bounded.
pub(crate) fn transport_client() -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!("Falling back to a default HTTP client: {}", err);
            Client::new()
        })
}
