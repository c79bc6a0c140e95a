use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a loan input file, JSON or YAML by extension, into a typed struct.
pub fn read_input<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let resolved = resolve_path(path)?;
    let contents = fs::read_to_string(&resolved)
        .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;

    let is_yaml = matches!(
        resolved.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let value: T = if is_yaml {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", resolved.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", resolved.display(), e))?
    };
    tracing::debug!(path = %resolved.display(), "loaded input file");
    Ok(value)
}

fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let resolved = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !resolved.exists() {
        return Err(format!("File not found: {}", resolved.display()).into());
    }
    if !resolved.is_file() {
        return Err(format!("Not a file: {}", resolved.display()).into());
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_amortization_core::amortization::analysis::ExistingLoanInput;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_reads_yaml_input() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "current_balance: 150000\nannual_rate: 0.045\nmonthly_payment: 1200"
        )
        .unwrap();
        let input: ExistingLoanInput = read_input(file.path().to_str().unwrap()).unwrap();
        assert_eq!(input.current_balance, dec!(150000));
        assert_eq!(input.additional_payment, dec!(0));
    }

    #[test]
    fn test_reads_json_input() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(
            file,
            r#"{{"current_balance": "90000", "annual_rate": "0.06", "monthly_payment": "800", "additional_payment": "50"}}"#
        )
        .unwrap();
        let input: ExistingLoanInput = read_input(file.path().to_str().unwrap()).unwrap();
        assert_eq!(input.additional_payment, dec!(50));
    }

    #[test]
    fn test_missing_file_reported() {
        let err = read_input::<ExistingLoanInput>("/nonexistent/loan.json").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
