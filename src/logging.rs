//! Structured Logging for the Deposit Pipeline
//!
//! Provides structured logging with:
//! - JSON output for log aggregation services
//! - Correlation IDs tying together the steps of one flow invocation
//! - Flow step and failure events
//!
//! # Usage
//!
//! ```rust,ignore
//! use bridge_deposit::logging::{init_logging, LogLevel};
//!
//! // Initialize at startup
//! init_logging(LogLevel::Info, true)?; // JSON mode for production
//! ```

use serde::Serialize;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::types::deposit::DepositId;
use crate::types::flow::{ErrorKind, FlowError, FlowState};

// ============================================================================
// Log Levels
// ============================================================================

/// Application log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

// ============================================================================
// Structured Event Types
// ============================================================================

/// Event categories for structured logging
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Deposit flow state transitions
    Flow,
    /// Calls to the bridge service
    Bridge,
    /// Rejected input
    Validation,
    /// System events (startup, shutdown)
    System,
}

/// Structured log event
#[derive(Debug, Serialize)]
pub struct LogEvent {
    /// Event timestamp (ISO 8601)
    pub timestamp: String,
    pub level: String,
    pub category: EventCategory,
    pub message: String,
    /// Correlation ID of the flow invocation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
}

/// Error details for failure events
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    /// Raw bridge response, when there was one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEvent {
    /// Create a new log event
    pub fn new(level: LogLevel, category: EventCategory, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level: level.as_filter().to_uppercase(),
            category,
            message: message.into(),
            correlation_id: None,
            data: None,
            error: None,
        }
    }

    /// Add correlation ID
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Add structured data
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Add error details
    pub fn with_error(
        mut self,
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<serde_json::Value>,
    ) -> Self {
        self.error = Some(ErrorDetails {
            code: code.into(),
            message: message.into(),
            details,
        });
        self
    }

    /// Serialize this event to JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"error\": \"failed to serialize log\", \"message\": \"{}\"}}",
                self.message
            )
        })
    }
}

// ============================================================================
// Flow Event Logging
// ============================================================================

/// Log a flow entering `state`
pub fn log_flow_step(
    correlation_id: &str,
    state: FlowState,
    deposit_id: Option<&DepositId>,
    amount_sats: u64,
) {
    let event = LogEvent::new(LogLevel::Info, EventCategory::Flow, state.to_string())
        .with_correlation_id(correlation_id)
        .with_data(serde_json::json!({
            "state": state.to_string(),
            "terminal": state.is_terminal(),
            "deposit_id": deposit_id.map(|id| id.as_str()),
            "amount_sats": amount_sats,
        }));

    tracing::info!(target: "bridge_deposit::flow", "{}", event.to_json());
}

/// Log a flow that stopped in `state` with `error`
pub fn log_flow_failure(
    correlation_id: &str,
    state: FlowState,
    error: &FlowError,
    deposit_id: Option<&DepositId>,
) {
    let category = match error.kind {
        ErrorKind::Validation => EventCategory::Validation,
        _ => EventCategory::Bridge,
    };
    let level = if error.kind.is_retryable() || is_user_error(error) {
        LogLevel::Warn
    } else {
        LogLevel::Error
    };

    let event = LogEvent::new(level, category, format!("{} failed", error.step))
        .with_correlation_id(correlation_id)
        .with_data(serde_json::json!({
            "state": state.to_string(),
            "step": error.step,
            "deposit_id": deposit_id.map(|id| id.as_str()),
            "is_inscription_error": error.is_inscription_error,
            "can_resume": error.step.can_resume(),
        }))
        .with_error(error.kind.error_code(), &error.message, error.details.clone());

    match level {
        LogLevel::Error => tracing::error!(target: "bridge_deposit::flow", "{}", event.to_json()),
        _ => tracing::warn!(target: "bridge_deposit::flow", "{}", event.to_json()),
    }
}

/// Log a process-level event (startup, store opened)
pub fn log_system_event(message: &str, data: Option<serde_json::Value>) {
    let mut event = LogEvent::new(LogLevel::Info, EventCategory::System, message);
    if let Some(data) = data {
        event = event.with_data(data);
    }

    tracing::info!(target: "bridge_deposit::system", "{}", event.to_json());
}

/// Failures the user fixes by changing input or funding
fn is_user_error(error: &FlowError) -> bool {
    matches!(
        error.kind,
        ErrorKind::Validation | ErrorKind::InscriptionProtected
    )
}

// ============================================================================
// Initialization
// ============================================================================

/// Initialize the logging system
///
/// # Arguments
/// * `level` - Minimum log level to output
/// * `json_format` - Use JSON format (recommended for production)
pub fn init_logging(level: LogLevel, json_format: bool) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "bridge_deposit={},reqwest={}",
            level.as_filter(),
            LogLevel::Warn.as_filter()
        ))
    });

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_file(false),
            )
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    }

    Ok(())
}

/// Initialize logging from BridgeConfig
pub fn init_from_config(config: &crate::config::BridgeConfig) -> Result<(), LoggingError> {
    let level = LogLevel::from(config.log_level.as_str());
    init_logging(level, config.log_json)
}

/// Logging errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to initialize logging: {0}")]
    InitFailed(String),
}

/// Generate a unique correlation ID for one flow invocation
pub fn generate_correlation_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

// ============================================================================
// Tests
// ============================================================================
