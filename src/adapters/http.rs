use crate::domain::model::QuoteResponse;
use crate::domain::ports::{ConfigProvider, QuoteSource};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.api-ninjas.com/v1/quotes";
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Fetches random quotes with one GET per call. No retries.
pub struct HttpQuoteSource {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    category: Option<String>,
    timeout: Option<Duration>,
    headers: HashMap<String, String>,
}

impl HttpQuoteSource {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key,
            category: None,
            timeout: None,
            headers: HashMap::new(),
        }
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        let mut source = Self::new(config.api_endpoint(), config.api_key().map(str::to_string));
        source.category = config.category().map(str::to_string);
        source.timeout = config.request_timeout();
        if let Some(headers) = config.extra_headers() {
            source.headers = headers.clone();
        }
        source
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    async fn fetch_random(&self) -> Result<Vec<QuoteResponse>> {
        let mut request = self.client.get(&self.endpoint);

        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        if let Some(category) = &self.category {
            request = request.query(&[("category", category)]);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("Requesting random quote from: {}", self.endpoint);
        let response = request.send().await?;
        tracing::debug!("Quote API response status: {}", response.status());

        let items: Vec<QuoteResponse> = response.error_for_status()?.json().await?;
        tracing::debug!("Quote API returned {} item(s)", items.len());

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::QuoteError;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_sends_api_key_and_parses_items() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/quotes")
                .header("x-api-key", "secret");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"quote": "Q", "author": "A", "category": "C"}
                ]));
        });

        let source = HttpQuoteSource::new(server.url("/v1/quotes"), Some("secret".to_string()));
        let items = source.fetch_random().await.unwrap();

        api_mock.assert();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quote, "Q");
        assert_eq!(items[0].author, "A");
        assert_eq!(items[0].category, "C");
    }

    #[tokio::test]
    async fn test_fetch_passes_category_query() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/quotes")
                .query_param("category", "happiness");
            then.status(200).json_body(serde_json::json!([]));
        });

        let source = HttpQuoteSource::new(server.url("/v1/quotes"), None).with_category("happiness");
        let items = source.fetch_random().await.unwrap();

        api_mock.assert();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_an_api_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/v1/quotes");
            then.status(401).json_body(serde_json::json!({"error": "Invalid API Key."}));
        });

        let source = HttpQuoteSource::new(server.url("/v1/quotes"), Some("wrong".to_string()));
        let result = source.fetch_random().await;

        api_mock.assert();
        assert!(matches!(result, Err(QuoteError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/quotes");
            then.status(200).body("not json");
        });

        let source = HttpQuoteSource::new(server.url("/v1/quotes"), None);
        assert!(source.fetch_random().await.is_err());
    }
}
