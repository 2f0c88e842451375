use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use shared_config::AppConfig;

use crate::error::NotificationError;
use crate::phone::normalize_phone;

#[derive(Debug, Clone, Deserialize)]
pub struct SmsReceipt {
    pub sid: String,
    pub status: String,
    pub to: String,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_sms(&self, to: &str, body: &str) -> Result<SmsReceipt, NotificationError>;
}

/// Twilio Programmable Messaging over its REST API.
pub struct TwilioClient {
    client: Client,
    api_base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
    country_code: String,
}

impl TwilioClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: crate::transport_client(),
            api_base_url: config.twilio_api_base_url.trim_end_matches('/').to_string(),
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            from_number: config.twilio_phone_number.clone(),
            country_code: config.sms_country_code.clone(),
        }
    }

    fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty() && !self.from_number.is_empty()
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base_url, self.account_sid
        )
    }
}

#[async_trait]
impl SmsSender for TwilioClient {
    async fn send_sms(&self, to: &str, body: &str) -> Result<SmsReceipt, NotificationError> {
        let destination = normalize_phone(to, &self.country_code)?;
        debug!("Normalised phone number {} -> {}", to, destination);

        if !self.is_configured() {
            return Err(NotificationError::NotConfigured("SMS gateway"));
        }

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", destination.as_str()),
                ("From", self.from_number.as_str()),
                ("Body", body),
            ])
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

        let receipt: SmsReceipt = response.json().await?;

        if let Some(code) = receipt.error_code {
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                message: format!(
                    "Twilio error {}: {}",
                    code,
                    receipt.error_message.clone().unwrap_or_default()
                ),
            });
        }
        if receipt.status == "failed" {
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                message: format!("Message {} failed", receipt.sid),
            });
        }

        info!("SMS {} {} to {}", receipt.sid, receipt.status, receipt.to);
        Ok(receipt)
    }
}
