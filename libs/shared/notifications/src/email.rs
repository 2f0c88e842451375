use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;

use crate::error::NotificationError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailReceipt {
    #[serde(default, alias = "id")]
    pub message_id: Option<String>,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<EmailReceipt, NotificationError>;
}

/// HTTP mail relay. Posts `{from, to, subject, html}` with a bearer API key.
pub struct MailRelayClient {
    client: Client,
    relay_url: String,
    api_key: String,
    from: String,
}

impl MailRelayClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: crate::transport_client(),
            relay_url: config.mail_relay_url.clone(),
            api_key: config.mail_relay_api_key.clone(),
            from: config.mail_from.clone(),
        }
    }

    fn is_configured(&self) -> bool {
        !self.relay_url.is_empty() && !self.api_key.is_empty() && !self.from.is_empty()
    }
}

#[async_trait]
impl EmailSender for MailRelayClient {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<EmailReceipt, NotificationError> {
        if !self.is_configured() {
            return Err(NotificationError::NotConfigured("Mail relay"));
        }

        debug!("Sending email '{}' to {}", subject, to);

        let response = self
            .client
            .post(&self.relay_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": format!("Healthcare System <{}>", self.from),
                "to": to,
                "subject": subject,
                "html": html,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let receipt = response.json::<EmailReceipt>().await.unwrap_or_default();
        info!("Email sent to {} (message id: {:?})", to, receipt.message_id);

        Ok(receipt)
    }
}
