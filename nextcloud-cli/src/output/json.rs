//! JSON output formatting.

use anyhow::Result;
use serde::Serialize;

use crate::ExitCode;

/// Error document printed in JSON mode, so scripts can branch on `kind`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub error: String,
    pub kind: &'static str,
    pub exit_code: i32,
}

impl ErrorOutput {
    /// Builds the document for a failed command.
    pub fn new(err: &anyhow::Error, code: ExitCode) -> Self {
        let kind = match code {
            ExitCode::Success => "none",
            ExitCode::Error => "error",
            ExitCode::NotCapable => "not_capable",
            ExitCode::Unauthorized => "unauthorized",
            ExitCode::Timeout => "timeout",
            ExitCode::Cancelled => "cancelled",
        };
        Self {
            error: format!("{err:#}"),
            kind,
            exit_code: code as i32,
        }
    }
}

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a command failure.
    pub fn format_error(&self, err: &anyhow::Error, code: ExitCode) -> Result<String> {
        self.format(&ErrorOutput::new(err, code))
    }
}
