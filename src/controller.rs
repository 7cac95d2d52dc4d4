// src/controller.rs
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::{AppConfig, OrderingPolicy, ValidationMode};
use crate::errors::{PredictError, Result};
use crate::form::{Field, FormState};
use crate::models::{DisplayState, PredictionResult};
use crate::payload::{self, Advisory, FieldError, RequestPayload};
use crate::providers::PredictionService;

/// The only failure text users ever see for a failed prediction call.
pub const GENERIC_ERROR: &str = "Error connecting to server. Is backend running?";

/// One started submission. Hand it back to [`FormSubmissionController::complete`]
/// together with the service's answer.
#[derive(Debug, Clone)]
pub struct Submission {
    pub seq: u64,
    pub request_id: Uuid,
    pub payload: RequestPayload,
}

/// Owns the form and projects submissions into idle, pending or settled.
pub struct FormSubmissionController {
    form: FormState,
    result: Option<PredictionResult>,
    error: Option<String>,
    field_errors: Vec<FieldError>,
    loading: bool,
    in_flight: HashMap<u64, Uuid>,
    latest_seq: u64,
    settled_at: Option<DateTime<Utc>>,
    ordering: OrderingPolicy,
    validation: ValidationMode,
}

impl Default for FormSubmissionController {
    fn default() -> Self {
        Self::new(OrderingPolicy::default(), ValidationMode::default())
    }
}

impl FormSubmissionController {
    pub fn new(ordering: OrderingPolicy, validation: ValidationMode) -> Self {
        Self {
            form: FormState::new(),
            result: None,
            error: None,
            field_errors: Vec::new(),
            loading: false,
            in_flight: HashMap::new(),
            latest_seq: 0,
            settled_at: None,
            ordering,
            validation,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.ordering, config.validation)
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Field errors from the last strict-mode submission attempt.
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.settled_at
    }

    /// Number of requests started but not yet resolved.
    pub fn outstanding(&self) -> usize {
        self.in_flight.len()
    }

    pub fn advisories(&self) -> Vec<Advisory> {
        payload::advisories(&self.form)
    }

    pub fn display(&self) -> DisplayState<'_> {
        if self.loading {
            DisplayState::Pending
        } else if let Some(error) = &self.error {
            DisplayState::Failure(error.as_str())
        } else if let Some(result) = &self.result {
            DisplayState::Success(result)
        } else {
            DisplayState::Idle
        }
    }

    /// Update one field. Allowed at any time, including while a request is
    /// outstanding; never touches the result or error.
    pub fn edit_field(&mut self, field: Field, value: &str) -> Result<()> {
        self.form.set(field, value)
    }

    pub fn edit_by_name(&mut self, name: &str, value: &str) -> Result<()> {
        self.form.set_by_name(name, value)
    }

    /// Start a submission from the current form snapshot.
    ///
    /// Clears the previous result and error and enters the pending state. In
    /// strict mode an invalid form settles immediately with a validation
    /// message and no request is made.
    pub fn begin_submit(&mut self) -> Result<Submission> {
        self.result = None;
        self.error = None;
        self.field_errors.clear();

        self.latest_seq += 1;
        let seq = self.latest_seq;

        let payload = match self.validation {
            ValidationMode::Lenient => {
                let payload = RequestPayload::from_form(&self.form);
                let sentinels = payload.sentinel_fields();
                if !sentinels.is_empty() {
                    let names: Vec<&str> = sentinels.iter().map(|f| f.name()).collect();
                    log::warn!("Submitting with unparsable numeric fields: {}", names.join(", "));
                }
                payload
            }
            ValidationMode::Strict => match payload::validate(&self.form) {
                Ok(valid) => valid.into(),
                Err(errors) => {
                    let names: Vec<&str> = errors.iter().map(|e| e.field.name()).collect();
                    log::warn!("Submission blocked by invalid fields: {}", names.join(", "));
                    self.loading = false;
                    self.error = Some(format!("Please correct: {}", names.join(", ")));
                    self.field_errors = errors.clone();
                    self.settled_at = Some(Utc::now());
                    return Err(PredictError::Validation(errors));
                }
            },
        };

        for advisory in self.advisories() {
            log::warn!("{}", advisory.message);
        }

        let request_id = Uuid::new_v4();
        self.in_flight.insert(seq, request_id);
        self.loading = true;
        log::info!("[{}] submission #{} started", request_id, seq);

        Ok(Submission {
            seq,
            request_id,
            payload,
        })
    }

    /// Apply the outcome of submission `seq`. Returns whether the form changed.
    ///
    /// Unknown or already resolved submissions are ignored. Under
    /// `LastInitiatedWins` only the most recently started submission may settle
    /// the form.
    pub fn complete(&mut self, seq: u64, outcome: Result<PredictionResult>) -> bool {
        let Some(request_id) = self.in_flight.remove(&seq) else {
            log::debug!("Ignoring resolution of unknown submission #{}", seq);
            return false;
        };

        if self.ordering == OrderingPolicy::LastInitiatedWins && seq != self.latest_seq {
            log::debug!(
                "[{}] discarding stale submission #{} (latest is #{})",
                request_id,
                seq,
                self.latest_seq
            );
            return false;
        }

        self.loading = false;
        self.field_errors.clear();
        self.settled_at = Some(Utc::now());

        match outcome {
            Ok(result) => {
                log::info!(
                    "[{}] prediction: {} ({}, {})",
                    request_id,
                    result.prediction,
                    result.probability,
                    result.risk_level
                );
                self.result = Some(result);
                self.error = None;
            }
            Err(e) => {
                log::error!(
                    "[{}] prediction failed ({}): {}",
                    request_id,
                    e.failure_kind(),
                    e
                );
                self.result = None;
                self.error = Some(GENERIC_ERROR.to_string());
            }
        }
        true
    }

    /// Begin a submission, call the service and apply its answer.
    ///
    /// Only a strict-mode validation failure is returned as an error; service
    /// failures settle the form with [`GENERIC_ERROR`].
    pub async fn submit<S: PredictionService>(&mut self, service: &S) -> Result<()> {
        let submission = self.begin_submit()?;
        let outcome = service
            .predict(&submission.payload, submission.request_id)
            .await;
        self.complete(submission.seq, outcome);
        Ok(())
    }

    /// Run several started submissions concurrently and apply each answer in
    /// the order the service resolves them. Returns how many changed the form.
    pub async fn resolve_in_completion_order<S: PredictionService>(
        &mut self,
        service: &S,
        submissions: Vec<Submission>,
    ) -> usize {
        let mut pending: FuturesUnordered<_> = submissions
            .into_iter()
            .map(move |submission| async move {
                let outcome = service
                    .predict(&submission.payload, submission.request_id)
                    .await;
                (submission.seq, outcome)
            })
            .collect();

        let mut applied = 0;
        while let Some((seq, outcome)) = pending.next().await {
            if self.complete(seq, outcome) {
                applied += 1;
            }
        }
        applied
    }
}
