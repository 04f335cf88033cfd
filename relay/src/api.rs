use crate::config::Config;
use crate::envelope::{HealthResponse, RelayEnvelope};
use crate::errors::{RelayError, ServerError};
use crate::query::MedicineQuery;
use crate::service::Relay;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone)]
struct AppState {
    relay: Relay,
    service_name: Arc<str>,
}

pub fn router(relay: Relay, service_name: &str) -> Router {
    let state = AppState {
        relay,
        service_name: service_name.into(),
    };

    Router::new()
        .route("/api/health", get(health))
        .route("/api/medicine", post(medicine))
        .with_state(state)
}

/// Serves the API on the configured listener until Ctrl-C.
pub async fn serve(config: &Config, relay: Relay) -> Result<(), ServerError> {
    let app = router(relay, &config.service_name);

    let addr = format!("{}:{}", config.listener.host, config.listener.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, webhook = %config.webhook.url, "Relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: state.service_name.to_string(),
    })
}

async fn medicine(
    State(state): State<AppState>,
    payload: Result<Json<MedicineQuery>, JsonRejection>,
) -> Result<Json<RelayEnvelope>, RelayError> {
    // An unreadable body is treated like one with no fields
    let query = match payload {
        Ok(Json(query)) => query,
        Err(rejection) => {
            tracing::debug!(%rejection, "Unreadable submission body");
            MedicineQuery::default()
        }
    };

    state.relay.relay(&query).await.map(Json)
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.into_envelope())).into_response()
    }
}
