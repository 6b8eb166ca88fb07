use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method, RequestBuilder,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use shared_config::AppConfig;
use shared_models::error::AppError;

/// JSON-over-HTTP access to the clinic backend.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token.filter(|t| !t.is_empty()) {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Auth token contains invalid header characters, sending without it"),
            }
        }

        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut req = self.client.request(method, &url).headers(self.get_headers(auth_token));

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        self.send(req).await
    }

    pub async fn get_with_query<T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        auth_token: Option<&str>,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making GET request to {} with query {:?}", url, query);

        let req = self
            .client
            .get(&url)
            .headers(self.get_headers(auth_token))
            .query(query);

        self.send(req).await
    }

    async fn send<T>(&self, req: RequestBuilder) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        let response = req.send().await.map_err(|e| {
            error!("Transport error: {}", e);
            AppError::Network(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("API error ({}): {}", status, text);
            let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

            return Err(match status.as_u16() {
                401 | 403 => AppError::Auth(message_of(&body)),
                404 => AppError::NotFound(message_of(&body)),
                code => AppError::rejected(Some(code), &body),
            });
        }

        // Some endpoints acknowledge with an empty body.
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };

        serde_json::from_str::<T>(text).map_err(|e| {
            error!("Failed to decode response body: {}", e);
            AppError::InvalidResponse(e.to_string())
        })
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

fn message_of(body: &Value) -> String {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
