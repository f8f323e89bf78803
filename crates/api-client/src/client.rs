//! Main API client implementation

use crate::config::ClientConfig;
use crate::endpoints::RecipientApi;
use crate::error::{ApiError, ApiResult, ErrorContext};
use crate::session::Session;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// FoodBridge registry client
///
/// This client wraps `reqwest` and adds:
/// - Retry with exponential backoff for reads
/// - Request correlation IDs for tracing
/// - An explicitly injected [`Session`]
#[derive(Clone)]
pub struct FoodbridgeClient {
    inner: Client,
    config: Arc<ClientConfig>,
    session: Session,
}

impl std::fmt::Debug for FoodbridgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoodbridgeClient")
            .field("base_url", &self.config.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl FoodbridgeClient {
    /// Create a client configured from environment variables
    ///
    /// # Errors
    /// Returns a configuration error for invalid settings or if the HTTP
    /// client cannot be built.
    pub fn new() -> ApiResult<Self> {
        Self::with_config(ClientConfig::from_env()?, Session::from_env())
    }

    /// Create a client with a specific configuration and session
    ///
    /// # Errors
    /// Returns a configuration error for invalid settings or if the HTTP
    /// client cannot be built.
    pub fn with_config(config: ClientConfig, session: Session) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static("foodbridge-api-client/1.0"),
        );

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            inner,
            config: Arc::new(config),
            session,
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Access recipient endpoints
    #[must_use]
    pub fn recipient(&self) -> RecipientApi {
        RecipientApi::new(self.clone())
    }

    /// Perform a GET request, retrying transient failures
    #[instrument(skip(self, query))]
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = self.url(path);
        let request_id = Uuid::new_v4().to_string();
        let retry_config = &self.config.retry;
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..retry_config.max_attempts {
            if attempt > 0 {
                let delay = retry_config.delay_for_attempt(attempt);
                debug!(
                    request_id = %request_id,
                    attempt = attempt,
                    delay_ms = delay.as_millis(),
                    "Retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();
            let result = self
                .execute(&request_id, Method::GET, &url, query, Option::<&()>::None)
                .await;
            let elapsed = start.elapsed();

            match result {
                Ok(value) => {
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        elapsed_ms = elapsed.as_millis(),
                        "Request succeeded"
                    );
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt + 1 < retry_config.max_attempts => {
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        error = %e,
                        "Request failed, will retry"
                    );
                    last_error = Some(e);
                }
                Err(e) => {
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        error = %e,
                        "Request failed, not retrying"
                    );
                    return Err(e);
                }
            }
        }

        Err(ApiError::RetriesExhausted {
            attempts: retry_config.max_attempts,
            last_error: last_error.map_or_else(|| "Unknown error".to_string(), |e| e.to_string()),
        })
    }

    /// Perform a single POST request
    ///
    /// Never retried: POSTs here change registry state and a lost response
    /// does not tell us whether the change happened.
    #[instrument(skip(self, body))]
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.url(path);
        let request_id = Uuid::new_v4().to_string();

        let result = self
            .execute(&request_id, Method::POST, &url, &[], Some(body))
            .await;
        if let Err(ref e) = result {
            let context = ErrorContext {
                request_id: Some(request_id),
                endpoint: path.to_string(),
                method: Method::POST.to_string(),
            };
            warn!(context = %context, error = %e, "Request failed");
        }
        result
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Execute a single request without retry
    async fn execute<T: DeserializeOwned, B: Serialize>(
        &self,
        request_id: &str,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> ApiResult<T> {
        let mut request = self
            .inner
            .request(method, url)
            .header(X_REQUEST_ID, request_id);

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(auth) = self.session.authorization() {
            request = request.header(AUTHORIZATION, auth);
        }

        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle HTTP response and deserialize
    async fn handle_response<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ApiError::api_response(status.as_u16(), message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = ClientConfig::default().with_base_url("http://localhost:5000");
        let client = FoodbridgeClient::with_config(config, Session::anonymous());
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ClientConfig::default().with_base_url("localhost");
        let err = FoodbridgeClient::with_config(config, Session::anonymous()).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn test_url_joining() {
        let config = ClientConfig::default().with_base_url("https://registry.example.org/");
        let client = FoodbridgeClient::with_config(config, Session::bearer("t")).unwrap();
        assert_eq!(
            client.url("/api/Recipient/available-food"),
            "https://registry.example.org/api/Recipient/available-food"
        );
        assert!(!client.session().is_anonymous());
    }
}
