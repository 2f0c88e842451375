use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::SupabaseClient;
use shared_models::user::User;

use crate::models::{Conversation, Message, MessageError, SendMessageRequest};

const POPULATED_SELECT: &str =
    "*,sender:users!sender_id(id,name,role,avatar),receiver:users!receiver_id(id,name,role,avatar)";

pub struct MessageService {
    db: Arc<SupabaseClient>,
}

impl MessageService {
    pub fn new(db: Arc<SupabaseClient>) -> Self {
        Self { db }
    }

    pub async fn send(&self, sender: &User, request: SendMessageRequest) -> Result<Message, MessageError> {
        let new = request.validate(sender.id)?;

        let query = format!("select=id&id=eq.{}", new.receiver_id);
        let receiver: Option<serde_json::Value> = self.db.select_one("users", &query).await?;
        if receiver.is_none() {
            return Err(MessageError::ReceiverNotFound);
        }

        let row = serde_json::to_value(&new).map_err(|e| MessageError::Database(e.into()))?;
        let created: Message = self.db.insert("messages", row).await?;
        debug!("Message {} sent from {} to {}", created.id, sender.id, new.receiver_id);

        let query = format!("select={}&id=eq.{}", POPULATED_SELECT, created.id);
        Ok(self
            .db
            .select_one::<Message>("messages", &query)
            .await?
            .unwrap_or(created))
    }

    /// Both directions between `me` and `other`, oldest first.
    pub async fn thread(&self, me: Uuid, other: Uuid) -> Result<Vec<Message>, MessageError> {
        let query = format!(
            "select={}&or=(and(sender_id.eq.{me},receiver_id.eq.{other}),and(sender_id.eq.{other},receiver_id.eq.{me}))&order=created_at.asc",
            POPULATED_SELECT,
        );
        Ok(self.db.select("messages", &query).await?)
    }

    pub async fn conversations(&self, me: Uuid) -> Result<Vec<Conversation>, MessageError> {
        let query = format!(
            "select={}&or=(sender_id.eq.{me},receiver_id.eq.{me})&order=created_at.desc",
            POPULATED_SELECT,
        );
        let messages: Vec<Message> = self.db.select("messages", &query).await?;
        Ok(build_conversations(me, messages))
    }

    /// Marks everything `other` sent to `me` as read; returns how many changed.
    pub async fn mark_read(&self, me: Uuid, other: Uuid) -> Result<usize, MessageError> {
        let filter = format!(
            "receiver_id=eq.{}&sender_id=eq.{}&is_read=eq.false&select=id",
            me, other
        );
        let updated: Vec<serde_json::Value> = self
            .db
            .update("messages", &filter, json!({ "is_read": true }))
            .await?;
        info!("Marked {} messages from {} to {} as read", updated.len(), other, me);
        Ok(updated.len())
    }
}

/// Keeps the first message seen per counterpart. `messages` must be newest first.
pub fn build_conversations(me: Uuid, messages: Vec<Message>) -> Vec<Conversation> {
    let mut seen = HashSet::new();
    let mut conversations = Vec::new();

    for message in messages {
        let Some(user) = message.counterpart(me).cloned() else {
            debug!("Message {} has no counterpart details, skipping", message.id);
            continue;
        };
        if seen.insert(user.id) {
            conversations.push(Conversation {
                user,
                last_message: message,
            });
        }
    }

    conversations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use shared_models::user::UserSummary;

    fn summary(id: Uuid, name: &str) -> UserSummary {
        UserSummary {
            id,
            name: name.to_string(),
            email: None,
            phone: None,
            role: None,
            specialization: None,
            department: None,
            avatar: None,
        }
    }

    fn message(from: (Uuid, &str), to: (Uuid, &str), content: &str, minutes_ago: i64) -> Message {
        Message {
            id: Uuid::new_v4(),
            sender_id: from.0,
            receiver_id: to.0,
            content: content.to_string(),
            is_read: false,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            sender: Some(summary(from.0, from.1)),
            receiver: Some(summary(to.0, to.1)),
        }
    }

    #[test]
    fn test_latest_message_per_counterpart() {
        let me = (Uuid::new_v4(), "Me");
        let grey = (Uuid::new_v4(), "Grey");
        let house = (Uuid::new_v4(), "House");

        let newest_first = vec![
            message(grey, me, "See you tomorrow", 1),
            message(me, house, "Thanks doctor", 5),
            message(me, grey, "Is 10am fine?", 10),
            message(house, me, "Results are in", 20),
        ];

        let conversations = build_conversations(me.0, newest_first);

        assert_eq!(conversations.len(), 2);
        assert_eq!(conversations[0].user.name, "Grey");
        assert_eq!(conversations[0].last_message.content, "See you tomorrow");
        assert_eq!(conversations[1].user.name, "House");
        assert_eq!(conversations[1].last_message.content, "Thanks doctor");
    }

    #[test]
    fn test_messages_without_counterpart_are_skipped() {
        let me = (Uuid::new_v4(), "Me");
        let gone = (Uuid::new_v4(), "Gone");
        let mut orphan = message(gone, me, "hello", 1);
        orphan.sender = None;

        assert!(build_conversations(me.0, vec![orphan]).is_empty());
    }
}
