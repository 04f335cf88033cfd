use crate::envelope::RelayEnvelope;
use crate::query::MedicineQuery;
use formatter::format_response;
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Shown when the relay rejects a submission without saying why.
pub const DEFAULT_REJECTION: &str = "Request failed.";

#[derive(Error, Debug)]
pub enum ClientError {
    /// The relay answered but did not relay successfully. `data` holds the
    /// webhook payload when the relay passed one back.
    #[error("{message}")]
    Rejected {
        message: String,
        data: Option<Value>,
    },

    #[error("invalid API base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Webhook payload returned by a successful submission.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub data: Option<Value>,
}

impl Submission {
    pub fn display(&self) -> String {
        format_response(self.data.as_ref())
    }
}

/// Submits queries to a running relay API.
pub struct Client {
    http: reqwest::Client,
    endpoint: Url,
}

impl Client {
    pub fn new(api_base: &Url) -> Result<Self, ClientError> {
        Ok(Client {
            http: reqwest::Client::new(),
            endpoint: medicine_endpoint(api_base)?,
        })
    }

    /// Trims both inputs and posts them to the relay.
    pub async fn submit(&self, medicine: &str, disease: &str) -> Result<Submission, ClientError> {
        let query = MedicineQuery::new(medicine.trim(), disease.trim());

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&query)
            .send()
            .await?;
        let status = response.status();
        let payload: RelayEnvelope = response.json().await?;

        if !status.is_success() || !payload.ok {
            tracing::debug!(%status, "Relay rejected submission");
            return Err(ClientError::Rejected {
                message: payload
                    .message
                    .unwrap_or_else(|| DEFAULT_REJECTION.to_string()),
                data: payload.data,
            });
        }

        Ok(Submission { data: payload.data })
    }
}

// Appends to the base path so a relay mounted under a prefix is still reached
fn medicine_endpoint(api_base: &Url) -> Result<Url, url::ParseError> {
    let mut base = api_base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("api/medicine")
}
