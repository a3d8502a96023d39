use crate::config::Config;
use crate::errors::AppError;
use crate::models::{LeadSubmission, RelayDocument, RelayResponse};
use crate::services::{SolarApiService, WebhookService};
use crate::transform::transform;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration, loaded once at startup.
    pub config: Config,
    /// Shared HTTP client for the solar provider and the webhook.
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

/// GET /
///
/// Liveness probe with a JSON body.
pub async fn root() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "solar-lead-relay",
            "message": "Solar lead relay is running"
        })),
    )
}

/// GET /health
pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// POST /
///
/// Validates a lead submission, enriches it with the provider's building
/// insights, forwards the combined document to the webhook and echoes it back.
///
/// Only validation, configuration and provider failures change the status
/// code. A malformed provider document or a failed webhook delivery is
/// reported inside the 200 body.
///
/// # Returns
///
/// * `Result<Json<RelayResponse>, AppError>` - The combined document with the webhook outcome.
pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LeadSubmission>, JsonRejection>,
) -> Result<Json<RelayResponse>, AppError> {
    let Json(submission) = payload?;
    let lead = submission.validate()?;

    tracing::info!(
        "POST / - lead at ({}, {}) with monthly bill {}",
        lead.latitude,
        lead.longitude,
        lead.monthly_bill
    );

    let solar_api = SolarApiService::new(state.http_client.clone(), &state.config)?;
    let insights = solar_api
        .fetch_building_insights(lead.latitude, lead.longitude)
        .await?;

    let solar_analysis = transform(Some(&insights), lead.monthly_bill);
    if let Some(error) = solar_analysis.error() {
        tracing::warn!("Solar analysis incomplete: {}", error);
    }

    let document = RelayDocument::new(lead, solar_analysis);
    tracing::debug!("Built submission {}", document.submission_id);

    let webhook = WebhookService::new(state.http_client.clone(), &state.config);
    let webhook_result = webhook.forward(&document).await;

    tracing::info!(
        "Submission {} processed (webhook delivered: {})",
        document.submission_id,
        webhook_result.success
    );

    Ok(Json(RelayResponse {
        document,
        webhook_result,
    }))
}
