use crate::envelope::RelayEnvelope;
use crate::errors::RelayError;
use crate::metrics_defs::{RELAY_REQUESTS, UPSTREAM_DURATION};
use crate::query::MedicineQuery;
use crate::webhook::{Webhook, WebhookReply};
use crate::{counter, histogram};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Forwards submissions to the webhook and normalizes what comes back.
///
/// Holds no per-request state. Concurrent calls are independent of each other.
#[derive(Clone)]
pub struct Relay {
    webhook: Arc<dyn Webhook>,
}

impl Relay {
    pub fn new(webhook: Arc<dyn Webhook>) -> Self {
        Relay { webhook }
    }

    /// Relays one submission.
    ///
    /// Invalid submissions are rejected before the webhook is contacted.
    /// Otherwise exactly one upstream call is made, with no retry.
    pub async fn relay(&self, query: &MedicineQuery) -> Result<RelayEnvelope, RelayError> {
        let result = self.forward(query).await;

        let outcome = match &result {
            Ok(_) => {
                tracing::info!(target_url = self.webhook.target(), "Relayed submission");
                "ok"
            }
            Err(RelayError::Validation) => {
                tracing::debug!("Rejected submission with missing fields");
                "invalid"
            }
            Err(e) => {
                tracing::warn!(
                    target_url = self.webhook.target(),
                    status = %e.status(),
                    error = %e,
                    "Relay failed"
                );
                e.outcome()
            }
        };
        counter!(RELAY_REQUESTS, "outcome" => outcome).increment(1);

        result
    }

    async fn forward(&self, query: &MedicineQuery) -> Result<RelayEnvelope, RelayError> {
        query.validate()?;
        tracing::debug!(
            medicine_len = query.medicine_name.len(),
            disease_len = query.disease.len(),
            "Forwarding submission"
        );

        let started = Instant::now();
        let reply = self.webhook.post(query).await;
        histogram!(UPSTREAM_DURATION).record(started.elapsed().as_secs_f64());

        let reply = reply?;
        let data = interpret_body(&reply)?;

        if !reply.status.is_success() {
            return Err(RelayError::UpstreamStatus {
                status: reply.status,
                data,
            });
        }

        Ok(RelayEnvelope::success(data))
    }
}

/// JSON when the webhook says so, opaque text otherwise.
fn interpret_body(reply: &WebhookReply) -> Result<Value, RelayError> {
    if reply.declares_json() {
        return serde_json::from_slice(&reply.body)
            .map_err(|e| RelayError::UpstreamProtocol(e.to_string()));
    }

    Ok(Value::String(
        String::from_utf8_lossy(&reply.body).into_owned(),
    ))
}
