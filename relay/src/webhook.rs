use crate::config::{ValidationError, WebhookConfig};
use crate::query::MedicineQuery;
use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use http::header::CONTENT_TYPE;
use std::error::Error as StdError;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Request to {0} timed out")]
    Timeout(String),

    #[error("Request to {0} failed: {1}")]
    RequestFailed(String, String),

    #[error("Failed to read response body: {0}")]
    ResponseBody(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("{0}")]
    Config(#[from] ValidationError),
}

/// What came back from the webhook, before any interpretation.
#[derive(Clone, Debug)]
pub struct WebhookReply {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl WebhookReply {
    /// True when the declared content type mentions `application/json`.
    pub fn declares_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }
}

/// The external endpoint a submission is forwarded to.
///
/// Every call to `post` performs exactly one outbound request. Retries are
/// not attempted at this layer.
#[async_trait]
pub trait Webhook: Send + Sync {
    /// Identifies the endpoint in logs
    fn target(&self) -> &str;

    async fn post(&self, query: &MedicineQuery) -> Result<WebhookReply, WebhookError>;
}

/// Webhook reached over HTTP with reqwest.
pub struct HttpWebhook {
    client: reqwest::Client,
    url: Url,
}

impl HttpWebhook {
    pub fn new(config: &WebhookConfig) -> Result<Self, WebhookError> {
        let url = config.parsed_url()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| WebhookError::Client(e.to_string()))?;

        Ok(HttpWebhook { client, url })
    }

    fn request_error(&self, e: reqwest::Error) -> WebhookError {
        if e.is_timeout() {
            WebhookError::Timeout(self.url.to_string())
        } else {
            WebhookError::RequestFailed(self.url.to_string(), error_chain(&e))
        }
    }
}

#[async_trait]
impl Webhook for HttpWebhook {
    fn target(&self) -> &str {
        self.url.as_str()
    }

    async fn post(&self, query: &MedicineQuery) -> Result<WebhookReply, WebhookError> {
        // `json` sets `Content-Type: application/json`
        let response = self
            .client
            .post(self.url.clone())
            .json(query)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                WebhookError::Timeout(self.url.to_string())
            } else {
                WebhookError::ResponseBody(error_chain(&e))
            }
        })?;

        Ok(WebhookReply {
            status,
            content_type,
            body,
        })
    }
}

// reqwest keeps the useful part (connection refused, dns failure) in the source chain
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
