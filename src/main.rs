use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use cardiocheck::banner;
use cardiocheck::config::{AppConfig, PatientFile};
use cardiocheck::view;
use cardiocheck::{FormSubmissionController, HttpPredictionService, PredictError, PredictionService};

#[tokio::main]
async fn main() -> ExitCode {
    banner::print_banner();

    let dotenv = dotenvy::dotenv();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Err(e) = dotenv {
        log::debug!("No .env file loaded: {}", e);
    }

    let Some(patient_path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: cardiocheck <patient.toml>");
        return ExitCode::from(2);
    };

    match run(patient_path).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Loads the patient, submits once and prints the settled screen.
/// Returns whether a prediction was obtained.
async fn run(patient_path: PathBuf) -> cardiocheck::Result<bool> {
    let config = AppConfig::load()?;
    let service = HttpPredictionService::from_config(&config)?;
    let mut controller = FormSubmissionController::from_config(&config);
    let color = std::io::stdout().is_terminal();

    let patient = PatientFile::from_file(&patient_path)?;
    for (name, value) in patient.entries()? {
        controller.edit_by_name(&name, &value)?;
    }

    println!("📡 Prediction service: {}", service.endpoint());

    let submission = match controller.begin_submit() {
        Ok(submission) => submission,
        Err(PredictError::Validation(_)) => {
            println!("{}", view::render(&controller, color));
            return Ok(false);
        }
        Err(e) => return Err(e),
    };
    print!("{}", view::render_state(controller.display(), color));

    let outcome = service
        .predict(&submission.payload, submission.request_id)
        .await;
    controller.complete(submission.seq, outcome);

    println!("{}", view::render(&controller, color));
    Ok(controller.result().is_some())
}
