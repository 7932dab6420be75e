pub mod config;
pub mod coverage;
pub mod doctor;
pub mod refresh;
pub mod stats;

use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Runtime;

pub const EXIT_CONFIG_INVALID: u8 = 2;
pub const EXIT_COVERAGE_GAPS: u8 = 3;
pub const EXIT_REFRESH_FAILED: u8 = 4;
pub const EXIT_RUNTIME_FAILURE: u8 = 5;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::failure_with_data(command, error_class, message, exit_code, None)
    }

    pub fn failure_with_data(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// Single-threaded runtime for one command invocation.
pub(crate) fn command_runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime",
            format!("failed to initialize async runtime: {error}"),
            EXIT_RUNTIME_FAILURE,
        )
    })
}

pub(crate) fn to_data<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
