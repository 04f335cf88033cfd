use crate::config::ValidationError;
use crate::envelope::RelayEnvelope;
use crate::webhook::WebhookError;
use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub const VALIDATION_MESSAGE: &str = "medicineName and disease are required.";
pub const UPSTREAM_STATUS_MESSAGE: &str = "Webhook returned an error.";
pub const UNREACHABLE_MESSAGE: &str = "Failed to reach webhook.";

/// Errors that can occur while relaying a submission
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("medicineName and disease are required")]
    Validation,

    /// The webhook answered with a non-2xx status
    #[error("Webhook responded with status {status}")]
    UpstreamStatus { status: StatusCode, data: Value },

    /// The webhook declared a JSON body but the body did not parse
    #[error("Webhook sent malformed JSON: {0}")]
    UpstreamProtocol(String),

    #[error("Webhook unreachable: {0}")]
    Unreachable(#[from] WebhookError),
}

impl RelayError {
    /// Status code the relay answers its own caller with.
    ///
    /// Upstream statuses are passed through unchanged.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Validation => StatusCode::BAD_REQUEST,
            RelayError::UpstreamStatus { status, .. } => *status,
            RelayError::UpstreamProtocol(_) | RelayError::Unreachable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label used for metrics and logs
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::Validation => "invalid",
            RelayError::UpstreamStatus { .. } => "upstream_error",
            RelayError::UpstreamProtocol(_) => "upstream_protocol",
            RelayError::Unreachable(_) => "unreachable",
        }
    }

    pub fn into_envelope(self) -> RelayEnvelope {
        match self {
            RelayError::Validation => RelayEnvelope::failure(VALIDATION_MESSAGE),
            RelayError::UpstreamStatus { data, .. } => {
                RelayEnvelope::failure(UPSTREAM_STATUS_MESSAGE).with_data(data)
            }
            RelayError::UpstreamProtocol(detail) => {
                RelayEnvelope::failure(UNREACHABLE_MESSAGE).with_error(detail)
            }
            RelayError::Unreachable(e) => {
                RelayEnvelope::failure(UNREACHABLE_MESSAGE).with_error(e.to_string())
            }
        }
    }
}

/// Errors that stop the relay server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid relay configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("webhook client error: {0}")]
    Webhook(#[from] WebhookError),
}
