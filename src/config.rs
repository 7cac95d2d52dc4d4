// src/config.rs
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{PredictError, Result};

/// Which resolution is shown when submissions overlap.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingPolicy {
    /// Only the most recently started submission may settle the form.
    #[default]
    LastInitiatedWins,
    /// Whichever submission resolves last overwrites the form.
    LastResolvedWins,
}

/// Whether numeric fields are checked before a request is sent.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationMode {
    /// Unparsable numbers are sent as `null`.
    #[default]
    Lenient,
    /// Field errors block the submission.
    Strict,
}

impl std::str::FromStr for OrderingPolicy {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "last-initiated-wins" | "last-initiated" => Ok(OrderingPolicy::LastInitiatedWins),
            "last-resolved-wins" | "last-resolved" => Ok(OrderingPolicy::LastResolvedWins),
            other => Err(PredictError::Config(format!(
                "unknown ordering policy '{}'",
                other
            ))),
        }
    }
}

impl std::str::FromStr for ValidationMode {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "lenient" => Ok(ValidationMode::Lenient),
            "strict" => Ok(ValidationMode::Strict),
            other => Err(PredictError::Config(format!(
                "unknown validation mode '{}'",
                other
            ))),
        }
    }
}

fn default_api_base() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_predict_path() -> String {
    "/predict/heart".to_string()
}

/// Client configuration. Read from an optional TOML file, then overridden by
/// `CARDIOCHECK_*` environment variables.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base address of the prediction service
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_predict_path")]
    pub predict_path: String,

    /// Request timeout. Unset means wait indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub ordering: OrderingPolicy,

    #[serde(default)]
    pub validation: ValidationMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            predict_path: default_predict_path(),
            timeout_secs: None,
            ordering: OrderingPolicy::default(),
            validation: ValidationMode::default(),
        }
    }
}

impl AppConfig {
    /// Full URL of the prediction endpoint.
    pub fn endpoint(&self) -> String {
        let path = self.predict_path.trim_start_matches('/');
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text)?;
        config.check()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Config file (if any) overridden by environment variables.
    ///
    /// The file is `$CARDIOCHECK_CONFIG` when set, otherwise
    /// `<config dir>/cardiocheck/config.toml` when it exists.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok(), dirs::config_dir())
    }

    /// [`AppConfig::load`] with the environment and the per-user config
    /// directory supplied by the caller.
    pub fn load_with<F>(lookup: F, config_dir: Option<PathBuf>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match config_file_path(&lookup, config_dir) {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        base.overlay(lookup)
    }

    /// Apply `CARDIOCHECK_*` overrides from `lookup`.
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_base) = lookup("CARDIOCHECK_API_BASE") {
            self.api_base = api_base;
        }
        if let Some(path) = lookup("CARDIOCHECK_PREDICT_PATH") {
            self.predict_path = path;
        }
        if let Some(secs) = lookup("CARDIOCHECK_TIMEOUT_SECS") {
            let secs = secs.trim();
            self.timeout_secs = if secs.is_empty() {
                None
            } else {
                Some(secs.parse().map_err(|_| {
                    PredictError::Config(format!(
                        "CARDIOCHECK_TIMEOUT_SECS must be an integer, got '{}'",
                        secs
                    ))
                })?)
            };
        }
        if let Some(ordering) = lookup("CARDIOCHECK_ORDERING") {
            self.ordering = ordering.parse()?;
        }
        if let Some(validation) = lookup("CARDIOCHECK_VALIDATION") {
            self.validation = validation.parse()?;
        }
        self.check()
    }

    fn check(self) -> Result<Self> {
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(PredictError::Config(format!(
                "api_base must be an http(s) URL, got '{}'",
                self.api_base
            )));
        }
        if self.timeout_secs == Some(0) {
            return Err(PredictError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Patient values to load into the form, read from a TOML file:
///
/// ```toml
/// [patient]
/// Age = 45
/// Sex = "M"
/// Oldpeak = "1.5"
/// ```
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PatientFile {
    #[serde(default)]
    pub patient: BTreeMap<String, toml::Value>,
}

impl PatientFile {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Field name and raw text pairs, ready to be applied as form edits.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        self.patient
            .iter()
            .map(|(name, value)| {
                let raw = match value {
                    toml::Value::String(s) => s.clone(),
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Float(f) => f.to_string(),
                    other => {
                        return Err(PredictError::Config(format!(
                            "patient field '{}' has unsupported value {}",
                            name, other
                        )));
                    }
                };
                Ok((name.clone(), raw))
            })
            .collect()
    }
}

fn config_file_path<F>(lookup: &F, config_dir: Option<PathBuf>) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup("CARDIOCHECK_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let default = config_dir?.join("cardiocheck").join("config.toml");
    default.exists().then_some(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_point_at_local_service() {
        let config = AppConfig::default();
        assert_eq!(config.endpoint(), "http://127.0.0.1:8000/predict/heart");
        assert_eq!(config.timeout(), None);
        assert_eq!(config.ordering, OrderingPolicy::LastInitiatedWins);
        assert_eq!(config.validation, ValidationMode::Lenient);
    }

    #[test]
    fn test_toml_file_fields() {
        let config = AppConfig::from_toml_str(
            r#"
            api_base = "https://predict.example.org/"
            timeout_secs = 5
            ordering = "last-resolved-wins"
            validation = "strict"
            "#,
        )
        .unwrap();

        assert_eq!(config.endpoint(), "https://predict.example.org/predict/heart");
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.ordering, OrderingPolicy::LastResolvedWins);
        assert_eq!(config.validation, ValidationMode::Strict);
    }

    #[test]
    fn test_env_overrides_file() {
        let config = AppConfig::from_toml_str(r#"api_base = "http://file:1""#)
            .unwrap()
            .overlay(env(&[
                ("CARDIOCHECK_API_BASE", "http://env:2"),
                ("CARDIOCHECK_PREDICT_PATH", "v2/predict"),
                ("CARDIOCHECK_ORDERING", "last-resolved"),
            ]))
            .unwrap();

        assert_eq!(config.endpoint(), "http://env:2/v2/predict");
        assert_eq!(config.ordering, OrderingPolicy::LastResolvedWins);
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        let err = AppConfig::default()
            .overlay(env(&[("CARDIOCHECK_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, PredictError::Config(_)));

        let err = AppConfig::default()
            .overlay(env(&[("CARDIOCHECK_VALIDATION", "paranoid")]))
            .unwrap_err();
        assert!(matches!(err, PredictError::Config(_)));

        let err = AppConfig::from_toml_str(r#"api_base = "127.0.0.1:8000""#).unwrap_err();
        assert!(matches!(err, PredictError::Config(_)));
    }

    #[test]
    fn test_patient_file_entries() {
        let patient = PatientFile::from_toml_str(
            r#"
            [patient]
            Age = 45
            Oldpeak = 1.5
            ST_Slope = "Flat"
            "#,
        )
        .unwrap();

        assert_eq!(
            patient.entries().unwrap(),
            vec![
                ("Age".to_string(), "45".to_string()),
                ("Oldpeak".to_string(), "1.5".to_string()),
                ("ST_Slope".to_string(), "Flat".to_string()),
            ]
        );
    }

    #[test]
    fn test_patient_file_rejects_tables() {
        let patient = PatientFile::from_toml_str("[patient]\nAge = [45]\n").unwrap();
        assert!(matches!(patient.entries(), Err(PredictError::Config(_))));
    }

    #[test]
    fn test_load_prefers_explicit_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.toml");
        std::fs::write(&explicit, r#"api_base = "http://explicit:1""#).unwrap();

        let user_dir = dir.path().join("user");
        std::fs::create_dir_all(user_dir.join("cardiocheck")).unwrap();
        std::fs::write(
            user_dir.join("cardiocheck").join("config.toml"),
            r#"api_base = "http://user:2""#,
        )
        .unwrap();

        let explicit_path = explicit.to_string_lossy().to_string();
        let config = AppConfig::load_with(
            env(&[("CARDIOCHECK_CONFIG", explicit_path.as_str())]),
            Some(user_dir.clone()),
        )
        .unwrap();
        assert_eq!(config.api_base, "http://explicit:1");

        let config = AppConfig::load_with(env(&[]), Some(user_dir)).unwrap();
        assert_eq!(config.api_base, "http://user:2");
    }

    #[test]
    fn test_load_without_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_with(env(&[]), Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config, AppConfig::default());

        let config = AppConfig::load_with(env(&[]), None).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_env_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_base = \"http://file:1\"\nvalidation = \"strict\"\n",
        )
        .unwrap();

        let path = path.to_string_lossy().to_string();
        let config = AppConfig::load_with(
            env(&[
                ("CARDIOCHECK_CONFIG", path.as_str()),
                ("CARDIOCHECK_API_BASE", "http://env:2"),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(config.api_base, "http://env:2");
        assert_eq!(config.validation, ValidationMode::Strict);
    }

    #[test]
    fn test_load_missing_explicit_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml").to_string_lossy().to_string();
        let err =
            AppConfig::load_with(env(&[("CARDIOCHECK_CONFIG", missing.as_str())]), None).unwrap_err();
        assert!(matches!(err, PredictError::FileRead(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = AppConfig::from_toml_str("api_base = ").unwrap_err();
        assert!(matches!(err, PredictError::TomlParse(_)));
    }
}
