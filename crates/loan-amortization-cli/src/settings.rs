use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::OutputFormat;

const DEFAULT_FILE: &str = "loancalc";
const ENV_PREFIX: &str = "LOANCALC";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid setting: {0}")]
    Validation(String),
}

/// CLI settings: defaults, then `loancalc.toml`, then `LOANCALC_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub output: OutputFormat,
    /// Month cap passed to every projection.
    pub max_months: u32,
    /// Round monetary output to cents. Off gives full Decimal precision.
    pub round_output: bool,
}

/// Load settings. An explicit `path` must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name(DEFAULT_FILE).required(false),
    };

    let settings = config::Config::builder()
        .set_default("output", "json")?
        .set_default("max_months", 1200)?
        .set_default("round_output", true)?
        .add_source(file)
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()?
        .try_deserialize::<Settings>()?;

    if settings.max_months == 0 {
        return Err(SettingsError::Validation(
            "max_months must be greater than zero".into(),
        ));
    }

    Ok(settings)
}
