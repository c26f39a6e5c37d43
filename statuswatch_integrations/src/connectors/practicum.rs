//! Practicum homework status connector.
//!
//! Fetches review-status snapshots with an OAuth token and a `from_date`
//! timestamp cursor.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use statuswatch_core::{Cursor, Error, Result, StatusSource};
use tracing::instrument;

/// Production endpoint for homework review statuses.
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

#[derive(Clone)]
pub struct PracticumSource {
    client: Client,
    endpoint: String,
    token: String,
}

impl PracticumSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: token.into(),
        }
    }

    /// Override the API endpoint (staging, local fixtures).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut h = HeaderMap::new();
        let auth = format!("OAuth {}", self.token);
        h.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|e| Error::connectivity("invalid authorization header", e))?,
        );
        Ok(h)
    }
}

#[async_trait]
impl StatusSource for PracticumSource {
    fn id(&self) -> &'static str {
        "practicum"
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, cursor: Cursor) -> Result<Value> {
        let resp = self
            .client
            .get(&self.endpoint)
            .headers(self.headers()?)
            .query(&[("from_date", cursor.timestamp())])
            .send()
            .await
            .map_err(|e| Error::connectivity(format!("GET {}", self.endpoint), e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let reason = status.canonical_reason().unwrap_or("unknown").to_string();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::ResponseCode {
                status: status.as_u16(),
                reason,
                body,
            });
        }

        resp.json()
            .await
            .map_err(|e| Error::Shape(format!("response body is not valid json: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_header_carries_oauth_token() {
        let source = PracticumSource::new("token-123");
        let headers = source.headers().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "OAuth token-123");
    }

    #[test]
    fn endpoint_is_overridable() {
        let source = PracticumSource::new("t").with_endpoint("http://localhost:9999/statuses");
        assert_eq!(source.endpoint, "http://localhost:9999/statuses");
    }
}
