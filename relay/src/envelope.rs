use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reported as `source` on every successful relay.
pub const WEBHOOK_SOURCE: &str = "n8n-webhook";

/// Normalized result of a relay call.
///
/// `ok == true` always carries `data`, `ok == false` always carries `message`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RelayEnvelope {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayEnvelope {
    pub fn success(data: Value) -> Self {
        RelayEnvelope {
            ok: true,
            source: Some(WEBHOOK_SOURCE.into()),
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        RelayEnvelope {
            ok: false,
            source: None,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
}
