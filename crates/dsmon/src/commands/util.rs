//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use serde_json::Value;

use crate::error::CliError;

/// Prompt for a secret on the terminal, rejecting empty input.
pub fn prompt_secret(prompt: &str, field: &str) -> Result<String, CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "no value given and stdin is not a terminal".into(),
        });
    }
    let value = rpassword::prompt_password(prompt)?;
    non_empty(value, field)
}

pub fn non_empty(value: String, field: &str) -> Result<String, CliError> {
    if value.trim().is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(value)
}

/// Parse a human-readable duration flag such as `"5s"` or `"250ms"`.
pub fn parse_duration(field: &str, raw: &str) -> Result<Duration, CliError> {
    humantime::parse_duration(raw.trim()).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("'{raw}': {e}"),
    })
}

/// Compact display of a JSON value; strings lose their quotes.
pub fn compact(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".into(),
        other => other.to_string(),
    }
}
