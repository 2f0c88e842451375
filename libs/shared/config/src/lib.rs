use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub jwt_secret: String,
    pub jwt_expires_in: String,
    pub mail_relay_url: String,
    pub mail_relay_api_key: String,
    pub mail_from: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_phone_number: String,
    pub twilio_api_base_url: String,
    pub sms_country_code: String,
    pub frontend_url: String,
    pub upload_dir: String,
    pub port: u16,
}

fn var_or_empty(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        warn!("{} not set, using empty value", key);
        String::new()
    })
}

fn var_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        warn!("{} not set, using default", key);
        default.to_string()
    })
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(|| {
                warn!("PORT not set or invalid, using default");
                5000
            });

        let config = Self {
            supabase_url: var_or_empty("SUPABASE_URL"),
            supabase_service_key: var_or_empty("SUPABASE_SERVICE_KEY"),
            jwt_secret: var_or_empty("JWT_SECRET"),
            jwt_expires_in: var_or_default("JWT_EXPIRE", "30d"),
            mail_relay_url: var_or_empty("MAIL_RELAY_URL"),
            mail_relay_api_key: var_or_empty("MAIL_RELAY_API_KEY"),
            mail_from: var_or_empty("MAIL_FROM"),
            twilio_account_sid: var_or_empty("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: var_or_empty("TWILIO_AUTH_TOKEN"),
            twilio_phone_number: var_or_empty("TWILIO_PHONE_NUMBER"),
            twilio_api_base_url: var_or_default("TWILIO_API_BASE_URL", "https://api.twilio.com"),
            sms_country_code: var_or_default("SMS_COUNTRY_CODE", "91"),
            frontend_url: var_or_default("FRONTEND_URL", "http://localhost:5173"),
            upload_dir: var_or_default("UPLOAD_DIR", "uploads"),
            port,
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }
        if !config.is_email_configured() {
            warn!("Mail relay not configured - email notifications will be dropped");
        }
        if !config.is_sms_configured() {
            warn!("SMS gateway not configured - SMS notifications will be dropped");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_service_key.is_empty()
            && !self.jwt_secret.is_empty()
    }

    pub fn is_email_configured(&self) -> bool {
        !self.mail_relay_url.is_empty()
            && !self.mail_relay_api_key.is_empty()
            && !self.mail_from.is_empty()
    }

    pub fn is_sms_configured(&self) -> bool {
        !self.twilio_account_sid.is_empty()
            && !self.twilio_auth_token.is_empty()
            && !self.twilio_phone_number.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> AppConfig {
        AppConfig {
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            jwt_secret: String::new(),
            jwt_expires_in: "30d".to_string(),
            mail_relay_url: String::new(),
            mail_relay_api_key: String::new(),
            mail_from: String::new(),
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            twilio_phone_number: String::new(),
            twilio_api_base_url: "https://api.twilio.com".to_string(),
            sms_country_code: "91".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            upload_dir: "uploads".to_string(),
            port: 5000,
        }
    }

    #[test]
    fn test_unconfigured_predicates() {
        let config = blank();
        assert!(!config.is_configured());
        assert!(!config.is_email_configured());
        assert!(!config.is_sms_configured());
    }

    #[test]
    fn test_sms_requires_sender_number() {
        let mut config = blank();
        config.twilio_account_sid = "AC123".to_string();
        config.twilio_auth_token = "token".to_string();
        assert!(!config.is_sms_configured());

        config.twilio_phone_number = "+15005550006".to_string();
        assert!(config.is_sms_configured());
    }
}
