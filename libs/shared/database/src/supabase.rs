use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// PostgREST client for the document tables (`users`, `appointments`,
/// `records`, `messages`). Authenticates with the service key; per-user
/// access rules are enforced by the API layer.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.service_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_key))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(method, path, body, extra_headers).await?;
        let data = response.json::<T>().await?;
        Ok(data)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                409 => anyhow!("Conflict: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        Ok(response)
    }

    fn representation() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    /// `GET /rest/v1/{table}?{query}`
    pub async fn select<T>(&self, table: &str, query: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}?{}", table, query);
        self.request(Method::GET, &path, None).await
    }

    /// Like [`select`](Self::select) but yields at most one row.
    pub async fn select_one<T>(&self, table: &str, query: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let rows: Vec<T> = self.select(table, query).await?;
        Ok(rows.into_iter().next())
    }

    /// Inserts one row and returns the stored representation.
    pub async fn insert<T>(&self, table: &str, row: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}", table);
        let rows: Vec<T> = self
            .request_with_headers(Method::POST, &path, Some(row), Some(Self::representation()))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Insert into {} returned no rows", table))
    }

    /// Patches every row matching `filter` and returns the updated rows.
    pub async fn update<T>(&self, table: &str, filter: &str, patch: Value) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}?{}", table, filter);
        self.request_with_headers(Method::PATCH, &path, Some(patch), Some(Self::representation()))
            .await
    }

    pub async fn delete(&self, table: &str, filter: &str) -> Result<()> {
        let path = format!("/rest/v1/{}?{}", table, filter);
        self.send(Method::DELETE, &path, None, None).await?;
        Ok(())
    }

    /// Counts rows matching `filter`. Uses the exact count from `Content-Range`
    /// when PostgREST provides it, otherwise the length of the returned page.
    pub async fn count(&self, table: &str, filter: &str) -> Result<usize> {
        let path = if filter.is_empty() {
            format!("/rest/v1/{}?select=id", table)
        } else {
            format!("/rest/v1/{}?select=id&{}", table, filter)
        };

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("count=exact"));

        let response = self.send(Method::GET, &path, None, Some(headers)).await?;

        let exact = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);

        if let Some(total) = exact {
            return Ok(total);
        }

        let rows: Vec<Value> = response.json().await?;
        Ok(rows.len())
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

/// Total from a PostgREST `Content-Range` header such as `0-24/3573` or `*/0`.
fn parse_content_range_total(header: &str) -> Option<usize> {
    header.rsplit('/').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(url: &str) -> AppConfig {
        AppConfig {
            supabase_url: url.to_string(),
            supabase_service_key: "service-key".to_string(),
            jwt_secret: "secret".to_string(),
            jwt_expires_in: "30d".to_string(),
            mail_relay_url: String::new(),
            mail_relay_api_key: String::new(),
            mail_from: String::new(),
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            twilio_phone_number: String::new(),
            twilio_api_base_url: String::new(),
            sms_country_code: "91".to_string(),
            frontend_url: String::new(),
            upload_dir: "uploads".to_string(),
            port: 0,
        }
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-24/*"), None);
    }

    #[tokio::test]
    async fn test_count_prefers_content_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .and(query_param("role", "eq.patient"))
            .and(header("Prefer", "count=exact"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Range", "0-0/42")
                    .set_body_json(json!([{ "id": 1 }])),
            )
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&config_for(&server.uri()));
        let total = client.count("users", "role=eq.patient").await.unwrap();
        assert_eq!(total, 42);
    }

    #[tokio::test]
    async fn test_count_falls_back_to_body_length() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/appointments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }, { "id": 2 }])))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&config_for(&server.uri()));
        assert_eq!(client.count("appointments", "").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_requests_representation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/messages"))
            .and(header("Prefer", "return=representation"))
            .and(header("apikey", "service-key"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": "m1" }])))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&config_for(&server.uri()));
        let row: Value = client.insert("messages", json!({ "content": "hi" })).await.unwrap();
        assert_eq!(row["id"], "m1");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&config_for(&server.uri()));
        let result: Result<Vec<Value>> = client.select("users", "select=*").await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("boom"));
    }
}
