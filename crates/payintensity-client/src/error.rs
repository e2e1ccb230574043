use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::new(
            "invalid_argument",
            message,
            vec!["Run `payintensity --help` for usage.".to_string()],
        )
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `payintensity {cmd} --help` for usage."),
            None => "Run `payintensity --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn malformed_input(message: &str, data: Value) -> Self {
        Self::new(
            "malformed_input",
            message,
            vec![
                "Fix the reported cell in the transaction table.".to_string(),
                "Numbers may use comma grouping (`1,234.5`) but nothing else.".to_string(),
                "No output was written; rerun once the input is fixed.".to_string(),
            ],
        )
        .with_data(data)
    }

    pub fn missing_columns(missing: Vec<String>, actual: Vec<String>) -> Self {
        Self::new(
            "malformed_input",
            "Transaction table is missing required columns.",
            vec![
                "Include `Country`, one column per supported year, `Latitude` and `Longitude`."
                    .to_string(),
                "Column names are case-sensitive.".to_string(),
            ],
        )
        .with_data(json!({
            "missing_columns": missing,
            "actual_columns": actual,
        }))
    }

    pub fn input_unreadable(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "input_unreadable",
            &format!("Could not read `{location}`: {detail}"),
            vec!["Verify the path exists and is readable.".to_string()],
        )
        .with_data(json!({ "path": location }))
    }

    pub fn transport_error(url: &str, detail: &str) -> Self {
        Self::new(
            "transport_error",
            &format!("Reference download from `{url}` failed: {detail}"),
            vec![
                "Check network access to the statistics API.".to_string(),
                "Retry, or switch to `--strategy per-unit` to tolerate partial failures."
                    .to_string(),
            ],
        )
        .with_data(json!({ "url": url }))
    }

    pub fn splice_target_not_found(path: &Path, declaration: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "splice_target_not_found",
            &format!("No match found for `const {declaration} = {{ ... }};` in `{location}`."),
            vec![
                format!("Add a `const {declaration} = {{` line and a closing `}};` line."),
                "Or pass `--declaration <name>` matching the existing block.".to_string(),
                "The host document was left unchanged.".to_string(),
            ],
        )
        .with_data(json!({
            "path": location,
            "declaration": declaration,
        }))
    }

    pub fn splice_target_ambiguous(path: &Path, declaration: &str, matches: usize) -> Self {
        let location = path.display().to_string();
        Self::new(
            "splice_target_ambiguous",
            &format!("Found {matches} `const {declaration}` blocks in `{location}`; expected one."),
            vec![
                "Remove the duplicate declarations from the host document.".to_string(),
                "The host document was left unchanged.".to_string(),
            ],
        )
        .with_data(json!({
            "path": location,
            "declaration": declaration,
            "matches": matches,
        }))
    }

    pub fn reference_table_invalid(message: &str) -> Self {
        Self::new(
            "reference_table_invalid",
            message,
            vec!["Correct the reference table and rerun.".to_string()],
        )
    }

    pub fn output_write_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "output_write_failed",
            &format!("Could not write `{location}`: {detail}"),
            vec![format!("Grant write access to `{location}` or choose another path.")],
        )
        .with_data(json!({ "path": location }))
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn is_internal(&self) -> bool {
        self.code.starts_with("internal_") || self.code == "output_write_failed"
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
