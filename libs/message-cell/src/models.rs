use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<UserSummary>,
}

impl Message {
    /// The participant that is not `me`, as embedded in the row.
    pub fn counterpart(&self, me: Uuid) -> Option<&UserSummary> {
        if self.sender_id == me {
            self.receiver.as_ref()
        } else {
            self.sender.as_ref()
        }
    }
}

/// Latest message exchanged with one counterpart. Derived on read, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub user: UserSummary,
    pub last_message: Message,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendMessageRequest {
    pub receiver: Option<Uuid>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub is_read: bool,
}

impl SendMessageRequest {
    pub fn validate(self, sender_id: Uuid) -> Result<NewMessage, MessageError> {
        let content = self.content.filter(|c| !c.trim().is_empty());
        let (Some(receiver_id), Some(content)) = (self.receiver, content) else {
            return Err(MessageError::Validation(
                "Receiver and message content are required".to_string(),
            ));
        };

        Ok(NewMessage {
            sender_id,
            receiver_id,
            content,
            is_read: false,
        })
    }
}

#[derive(Error, Debug)]
pub enum MessageError {
    #[error("{0}")]
    Validation(String),

    #[error("Receiver not found")]
    ReceiverNotFound,

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<MessageError> for AppError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::Validation(msg) => AppError::ValidationError(msg),
            MessageError::ReceiverNotFound => AppError::NotFound(err.to_string()),
            MessageError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}
