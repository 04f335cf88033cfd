pub mod api;
pub mod client;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod metrics_defs;
pub mod query;
pub mod service;
pub mod webhook;

#[cfg(test)]
mod testutils;

pub use errors::{RelayError, ServerError};
pub use service::Relay;

use std::sync::Arc;
use webhook::HttpWebhook;

/// Validates the configuration and serves the relay API over HTTP.
pub async fn run(config: config::Config) -> Result<(), ServerError> {
    config.validate()?;

    let webhook = HttpWebhook::new(&config.webhook)?;
    if config.webhook.timeout().is_none() {
        tracing::warn!("Webhook timeout disabled, a stuck webhook will hold requests open");
    }

    api::serve(&config, Relay::new(Arc::new(webhook))).await
}
