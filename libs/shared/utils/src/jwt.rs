use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use shared_models::auth::{JwtClaims, JwtHeader};
use shared_models::user::Role;

type HmacSha256 = Hmac<Sha256>;

fn sign(signing_input: &str, jwt_secret: &str) -> Result<Vec<u8>, String> {
    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Issues an HS256 token for `user_id` valid for `ttl`.
pub fn issue_token(
    user_id: &str,
    email: &str,
    role: Role,
    jwt_secret: &str,
    ttl: Duration,
) -> Result<String, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let now = Utc::now();
    let header = JwtHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };
    let claims = JwtClaims {
        sub: user_id.to_string(),
        exp: Some((now + ttl).timestamp().max(0) as u64),
        email: Some(email.to_string()),
        role: Some(role),
        iat: Some(now.timestamp() as u64),
    };

    let header_json = serde_json::to_string(&header).map_err(|e| e.to_string())?;
    let claims_json = serde_json::to_string(&claims).map_err(|e| e.to_string())?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );
    let signature = sign(&signing_input, jwt_secret)?;

    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<JwtClaims, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    // Split token into parts
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let signature_string = format!("{}.{}", header_b64, claims_b64);

    let mut mac = match HmacSha256::new_from_slice(jwt_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return Err("Failed to create HMAC".to_string()),
    };

    mac.update(signature_string.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_json = match URL_SAFE_NO_PAD.decode(claims_b64) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err("Invalid claims encoding".to_string()),
        },
        Err(_) => return Err("Invalid claims encoding".to_string()),
    };

    let claims: JwtClaims = match serde_json::from_str(&claims_json) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            return Err("Invalid claims format".to_string());
        }
    };

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    debug!("Token validated successfully for user: {}", claims.sub);
    Ok(claims)
}

/// Parses lifetimes such as `30d`, `12h`, `45m`, `90s` or a bare number of seconds.
pub fn parse_expiry(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (number, unit) = match value.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&value[..idx], Some(c)),
        _ => (value, None),
    };

    let amount: i64 = number.trim().parse().ok()?;
    if amount <= 0 {
        return None;
    }

    match unit {
        None | Some('s') => Some(Duration::seconds(amount)),
        Some('m') => Some(Duration::minutes(amount)),
        Some('h') => Some(Duration::hours(amount)),
        Some('d') => Some(Duration::days(amount)),
        Some('w') => Some(Duration::weeks(amount)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn test_issued_token_validates() {
        let token = issue_token("user-1", "a@example.com", Role::Doctor, SECRET, Duration::hours(1)).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, Some(Role::Doctor));
        assert_eq!(claims.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_token("user-1", "a@example.com", Role::Patient, SECRET, Duration::hours(1)).unwrap();
        assert_eq!(validate_token(&token, "other").unwrap_err(), "Invalid token signature");
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = issue_token("user-1", "a@example.com", Role::Patient, SECRET, Duration::hours(-2)).unwrap();
        assert_eq!(validate_token(&token, SECRET).unwrap_err(), "Token expired");
    }

    #[test]
    fn test_malformed_token() {
        assert_eq!(validate_token("abc", SECRET).unwrap_err(), "Invalid token format");
        assert!(issue_token("u", "e", Role::Admin, "", Duration::hours(1)).is_err());
    }

    #[test]
    fn test_parse_expiry() {
        assert_eq!(parse_expiry("30d"), Some(Duration::days(30)));
        assert_eq!(parse_expiry("12h"), Some(Duration::hours(12)));
        assert_eq!(parse_expiry("45m"), Some(Duration::minutes(45)));
        assert_eq!(parse_expiry("3600"), Some(Duration::seconds(3600)));
        assert_eq!(parse_expiry("2w"), Some(Duration::weeks(2)));
        assert_eq!(parse_expiry("soon"), None);
        assert_eq!(parse_expiry("0d"), None);
        assert_eq!(parse_expiry(""), None);
    }
}
