// src/lib.rs
pub mod banner;
pub mod config;
pub mod controller;
pub mod errors;
pub mod form;
pub mod models;
pub mod payload;
pub mod providers;
pub mod view;

pub use controller::{FormSubmissionController, Submission, GENERIC_ERROR};
pub use errors::{PredictError, Result};
pub use form::{Field, FormState};
pub use models::{DisplayState, PredictionResult};
pub use providers::{HttpPredictionService, PredictionService};
