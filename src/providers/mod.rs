// src/providers/mod.rs

use uuid::Uuid;

use crate::errors::Result;
use crate::models::PredictionResult;
use crate::payload::RequestPayload;

pub mod http;

pub use http::HttpPredictionService;

/// The remote service that turns a clinical payload into a classification.
///
/// Implementations make exactly one attempt per call: no retries, no caching.
/// Any non-success answer is reported as an error.
pub trait PredictionService: Send + Sync {
    /// Sends `payload` and returns the parsed prediction.
    ///
    /// # Arguments
    /// * `payload` - The coerced form values.
    /// * `request_id` - Correlation id for this submission, forwarded to the service and used in logs.
    fn predict(
        &self,
        payload: &RequestPayload,
        request_id: Uuid,
    ) -> impl std::future::Future<Output = Result<PredictionResult>> + Send;
}
