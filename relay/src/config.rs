use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_WEBHOOK_URL: &str = "http://localhost:5678/webhook/medicine";
pub const DEFAULT_SERVICE_NAME: &str = "medicine-webhook-server";

/// Environment variable overriding the listener port
pub const PORT_ENV: &str = "PORT";
/// Environment variable overriding the webhook URL
pub const WEBHOOK_URL_ENV: &str = "N8N_WEBHOOK_URL";

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Invalid PORT value: {0}")]
    InvalidPortOverride(String),

    #[error("Invalid webhook URL {0}: {1}")]
    InvalidWebhookUrl(String, url::ParseError),

    #[error("Webhook URL must use http or https, got: {0}")]
    UnsupportedScheme(String),

    #[error("Empty service name")]
    EmptyServiceName,
}

/// Relay configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Listener for the inbound API
    pub listener: Listener,
    /// Upstream webhook every submission is forwarded to
    pub webhook: WebhookConfig,
    /// Reported by the health endpoint
    pub service_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listener: Listener::default(),
            webhook: WebhookConfig::default(),
            service_name: DEFAULT_SERVICE_NAME.into(),
        }
    }
}

impl Config {
    /// Validates the relay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.webhook.parsed_url()?;

        if self.service_name.trim().is_empty() {
            return Err(ValidationError::EmptyServiceName);
        }

        Ok(())
    }

    /// Applies `PORT` and `N8N_WEBHOOK_URL` on top of the loaded values.
    ///
    /// Unset and empty variables leave the configured value in place.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(port) = lookup(PORT_ENV) {
            self.listener.port = port
                .trim()
                .parse()
                .map_err(|_| ValidationError::InvalidPortOverride(port))?;
        }

        if let Some(url) = lookup(WEBHOOK_URL_ENV) {
            self.webhook.url = url;
        }

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Upstream webhook configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: String,
    /// Deadline for the whole upstream exchange. 0 disables it.
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        WebhookConfig {
            url: DEFAULT_WEBHOOK_URL.into(),
            timeout_secs: 30,
        }
    }
}

impl WebhookConfig {
    pub fn parsed_url(&self) -> Result<Url, ValidationError> {
        let url = Url::parse(&self.url)
            .map_err(|e| ValidationError::InvalidWebhookUrl(self.url.clone(), e))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ValidationError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
