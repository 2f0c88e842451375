use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gateway rejected message ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Notification queue is closed")]
    QueueClosed,

    #[error("Notification queue is full")]
    QueueFull,
}
