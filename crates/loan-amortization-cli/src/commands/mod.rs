pub mod amortization;

use loan_amortization_core::presentation::RoundForDisplay;
use loan_amortization_core::ComputationOutput;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::input;
use crate::settings::Settings;

/// Settings every command needs.
pub struct Context {
    pub max_months: u32,
    pub round_output: bool,
}

impl Context {
    pub fn new(settings: &Settings) -> Self {
        Self {
            max_months: settings.max_months,
            round_output: settings.round_output,
        }
    }

    /// Serialize an envelope, rounding money to cents unless disabled.
    pub fn finish<T>(
        &self,
        mut output: ComputationOutput<T>,
    ) -> Result<Value, Box<dyn std::error::Error>>
    where
        T: Serialize + RoundForDisplay,
    {
        if self.round_output {
            output.result = output.result.rounded();
        }
        Ok(serde_json::to_value(output)?)
    }
}

/// Resolve a command's input: `--input` file, then flags, then piped stdin.
pub fn resolve_input<T: DeserializeOwned>(
    path: Option<&str>,
    from_flags: Option<T>,
    usage: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return input::file::read_input(path);
    }
    if let Some(value) = from_flags {
        return Ok(value);
    }
    if let Some(value) = input::stdin::read_stdin()? {
        return Ok(value);
    }
    Err(usage.into())
}
