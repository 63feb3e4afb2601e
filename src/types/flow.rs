//! Deposit Flow Types
//!
//! Types describing where a deposit flow is, how it ended, and what a
//! caller needs to resume it:
//!
//! ```text
//! VALIDATING → REGISTERING → PREPARING → EXECUTING → DONE
//!      └────────────┴────────────┴───────────┴──────→ FAILED(step)
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::deposit::{DepositId, DepositIntent};
use crate::bridge::sdk::BridgeError;

/// Step of the flow an error is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    Validation,
    CreateDeposit,
    PrepareTransaction,
    ExecuteTransaction,
    CompleteFlow,
}

impl FlowStep {
    /// Failing here means the whole flow has to start over
    pub fn requires_restart(&self) -> bool {
        matches!(self, Self::Validation | Self::CreateDeposit)
    }

    /// Failing here can be retried with the existing deposit ID
    pub fn can_resume(&self) -> bool {
        matches!(self, Self::PrepareTransaction | Self::ExecuteTransaction)
    }
}

impl std::fmt::Display for FlowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::CreateDeposit => "create_deposit",
            Self::PrepareTransaction => "prepare_transaction",
            Self::ExecuteTransaction => "execute_transaction",
            Self::CompleteFlow => "complete_flow",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for FlowStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "validation" => Ok(Self::Validation),
            "create_deposit" => Ok(Self::CreateDeposit),
            "prepare_transaction" => Ok(Self::PrepareTransaction),
            "execute_transaction" => Ok(Self::ExecuteTransaction),
            "complete_flow" => Ok(Self::CompleteFlow),
            _ => Err(format!("unknown flow step: {}", s)),
        }
    }
}

/// Classification of a flow failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad address or amount, caught before any network call
    Validation,
    /// Spendable balance is locked in inscription-bearing UTXOs
    InscriptionProtected,
    /// Transport or backend failure
    Network,
    Unknown,
}

impl ErrorKind {
    /// Whether the same call may simply be repeated
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Error code for display and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::InscriptionProtected => "INSCRIPTION_PROTECTED_ERROR",
            Self::Network => "NETWORK_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }
}

/// A classified failure, tagged with the step that produced it.
///
/// The raw bridge error is kept as `cause` and its response body as
/// `details`, so nothing the bridge said is lost.
#[derive(Debug, Clone, Error)]
#[error("{step} failed: {message}")]
pub struct FlowError {
    pub step: FlowStep,
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub cause: Option<BridgeError>,
    pub details: Option<serde_json::Value>,
    pub is_inscription_error: bool,
}

impl FlowError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            step: FlowStep::Validation,
            kind: ErrorKind::Validation,
            message: message.into(),
            cause: None,
            details: None,
            is_inscription_error: false,
        }
    }

    /// Remediation hint for errors the user can fix themselves
    pub fn remediation(&self) -> Option<&'static str> {
        match self.kind {
            ErrorKind::InscriptionProtected => Some(
                "Use a Bitcoin address without inscriptions, or add more spendable \
                 (non-inscribed) BTC to this address, then try again.",
            ),
            _ => None,
        }
    }
}

/// Position in the deposit state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Validating,
    Registering,
    Preparing,
    Executing,
    Done,
    Failed(FlowStep),
}

impl FlowState {
    /// State after the current one succeeds
    pub fn next(self) -> Self {
        match self {
            Self::Validating => Self::Registering,
            Self::Registering => Self::Preparing,
            Self::Preparing => Self::Executing,
            Self::Executing | Self::Done => Self::Done,
            Self::Failed(step) => Self::Failed(step),
        }
    }

    /// State after the current one fails
    pub fn fail(self) -> Self {
        match self {
            Self::Validating => Self::Failed(FlowStep::Validation),
            Self::Registering => Self::Failed(FlowStep::CreateDeposit),
            Self::Preparing => Self::Failed(FlowStep::PrepareTransaction),
            Self::Executing => Self::Failed(FlowStep::ExecuteTransaction),
            Self::Done => Self::Failed(FlowStep::CompleteFlow),
            Self::Failed(step) => Self::Failed(step),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

impl std::fmt::Display for FlowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validating => write!(f, "validating"),
            Self::Registering => write!(f, "registering"),
            Self::Preparing => write!(f, "preparing"),
            Self::Executing => write!(f, "executing"),
            Self::Done => write!(f, "done"),
            Self::Failed(step) => write!(f, "failed({})", step),
        }
    }
}

/// A flow that reached broadcast
#[derive(Debug, Clone)]
pub struct CompletedDeposit<P, E> {
    pub deposit_id: DepositId,
    pub prepared: P,
    pub execution: E,
}

/// A flow that stopped at `error.step`
///
/// `deposit_id` is set once registration succeeded and `prepared` once
/// preparation succeeded, so a failed execute still shows what was about
/// to be signed.
#[derive(Debug, Clone)]
pub struct FailedDeposit<P> {
    pub error: FlowError,
    pub deposit_id: Option<DepositId>,
    pub prepared: Option<P>,
}

impl<P> FailedDeposit<P> {
    pub fn new(error: FlowError) -> Self {
        Self {
            error,
            deposit_id: None,
            prepared: None,
        }
    }

    pub fn step(&self) -> FlowStep {
        self.error.step
    }

    /// Where a retry may pick up, if it does not have to start over
    pub fn resume_point(&self, intent: &DepositIntent) -> Option<ResumePoint> {
        if !self.error.step.can_resume() {
            return None;
        }

        self.deposit_id.as_ref().map(|deposit_id| ResumePoint {
            deposit_id: deposit_id.clone(),
            step: self.error.step,
            intent: intent.clone(),
            message: self.error.message.clone(),
            recorded_at: chrono::Utc::now().timestamp() as u64,
        })
    }
}

impl<P> std::fmt::Display for FailedDeposit<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "deposit flow failed: {}", self.error)
    }
}

impl<P: std::fmt::Debug> std::error::Error for FailedDeposit<P> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// What a caller persists to resume a flow without re-registering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePoint {
    pub deposit_id: DepositId,
    /// Step that failed
    pub step: FlowStep,
    pub intent: DepositIntent,
    /// Message of the failure that produced this point
    pub message: String,
    /// Unix timestamp (seconds)
    pub recorded_at: u64,
}
