// src/providers/http.rs

use reqwest::Client;
use std::time::Instant;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::{PredictError, Result};
use crate::models::PredictionResult;
use crate::payload::RequestPayload;
use crate::providers::PredictionService;

/// Header carrying the submission's correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Talks to the prediction service over HTTP with a JSON POST.
pub struct HttpPredictionService {
    client: Client,
    endpoint: String,
}

impl HttpPredictionService {
    /// Creates a service from an existing client and a full endpoint URL.
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Builds a client honouring the configured timeout, if any.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(builder.build()?, config.endpoint()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PredictionService for HttpPredictionService {
    async fn predict(&self, payload: &RequestPayload, request_id: Uuid) -> Result<PredictionResult> {
        log::info!("[{}] POST {}", request_id, self.endpoint);
        let sentinels = payload.sentinel_fields();
        if !sentinels.is_empty() {
            let names: Vec<&str> = sentinels.iter().map(|f| f.name()).collect();
            log::debug!("[{}] sending null for: {}", request_id, names.join(", "));
        }

        let start = Instant::now();

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(payload)
            .send()
            .await?;

        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        log::info!("[{}] response status: {} ({}ms)", request_id, status, latency_ms);

        if !status.is_success() {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            return Err(PredictError::ApiError {
                status: status.as_u16(),
                body: error_body,
            });
        }

        let body = resp.bytes().await?;
        let result: PredictionResult = serde_json::from_slice(&body)?;
        Ok(result)
    }
}
