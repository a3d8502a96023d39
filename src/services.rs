use crate::config::Config;
use crate::errors::AppError;
use crate::models::WebhookResult;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// Client for the provider's "building insights by coordinate" endpoint.
pub struct SolarApiService {
    client: Client,
    base_url: String,
    api_key: String,
    required_quality: String,
}

impl SolarApiService {
    /// Fails with [`AppError::Configuration`] when no API key is configured.
    pub fn new(client: Client, config: &Config) -> Result<Self, AppError> {
        let api_key = config.google_solar_api_key.clone().ok_or_else(|| {
            AppError::Configuration("Google Solar API key is not configured".to_string())
        })?;

        Ok(Self {
            client,
            base_url: config.solar_api_base_url.trim_end_matches('/').to_string(),
            api_key,
            required_quality: config.required_quality.clone(),
        })
    }

    /// Fetch the building insights document closest to the given coordinates
    pub async fn fetch_building_insights(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Value, AppError> {
        let latitude = latitude.to_string();
        let longitude = longitude.to_string();

        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(
            &format!("{}/v1/buildingInsights:findClosest", self.base_url),
            &[
                ("location.latitude", latitude.as_str()),
                ("location.longitude", longitude.as_str()),
                ("requiredQuality", self.required_quality.as_str()),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        tracing::info!(
            "Fetching building insights for ({}, {})",
            latitude,
            longitude
        );
        // Redact key from logs to prevent credential exposure
        tracing::debug!(
            "Solar API URL: {}/v1/buildingInsights:findClosest?location.latitude={}&location.longitude={}&requiredQuality={}&key=[REDACTED]",
            self.base_url,
            latitude,
            longitude,
            self.required_quality
        );

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Solar API returned error {}: {}", status, error_text);
            return Err(AppError::ExternalApiError(format!(
                "Solar API returned status {}: {}",
                status, error_text
            )));
        }

        let insights: Value = response.json().await?;

        if insights.is_null() {
            return Err(AppError::ExternalApiError(
                "Solar API returned an empty document".to_string(),
            ));
        }

        tracing::info!("Successfully fetched building insights");
        Ok(insights)
    }
}

/// Posts the combined document to the operator-configured webhook.
pub struct WebhookService {
    client: Client,
    webhook_url: Option<String>,
}

impl WebhookService {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            webhook_url: config.webhook_url.clone(),
        }
    }

    /// Forwards `document`. Delivery failures are reported, never returned as errors.
    pub async fn forward<T: Serialize + ?Sized>(&self, document: &T) -> WebhookResult {
        let Some(ref url) = self.webhook_url else {
            tracing::warn!("Webhook URL not configured, skipping forward");
            return WebhookResult::not_configured();
        };

        tracing::info!("Forwarding submission to webhook");

        let response = match self.client.post(url).json(document).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Webhook request failed: {}", e);
                return WebhookResult {
                    success: false,
                    status: None,
                    message: format!("Webhook request failed: {}", e),
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            tracing::info!("Webhook accepted submission ({})", status);
            return WebhookResult {
                success: true,
                status: Some(status.as_u16()),
                message: "Data sent to webhook successfully".to_string(),
            };
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::warn!("Webhook returned error {}: {}", status, error_text);

        WebhookResult {
            success: false,
            status: Some(status.as_u16()),
            message: format!("Webhook returned status {}: {}", status.as_u16(), error_text),
        }
    }
}
