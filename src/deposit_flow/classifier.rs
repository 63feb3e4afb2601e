//! Error Classifier
//!
//! Maps raw bridge errors onto the flow's error taxonomy. The original
//! error is always kept as the `cause`.
//!
//! The bridge has no error code for "all spendable UTXOs carry
//! inscriptions", so that case is recognised by two substrings in the
//! response body.

use crate::bridge::sdk::BridgeError;
use crate::types::flow::{ErrorKind, FlowError, FlowStep};

/// First marker of the inscription-protected failure
pub const INSUFFICIENT_FUNDS_MARKER: &str = "Insufficient funds after filtering";

/// Second marker of the inscription-protected failure
pub const INSCRIPTION_MARKER: &str = "UTXOs with inscriptions";

/// User-facing message for the inscription-protected failure
pub const INSCRIPTION_MESSAGE: &str = "Not enough spendable BTC: the remaining UTXOs at this \
     address hold inscriptions and are excluded from spending. Use an address without \
     inscriptions or add more spendable BTC.";

/// Whether a response body describes the inscription-protected failure
pub fn is_inscription_error(body: &str) -> bool {
    body.contains(INSUFFICIENT_FUNDS_MARKER) && body.contains(INSCRIPTION_MARKER)
}

/// Classify a bridge error raised while running `step`
pub fn classify(error: BridgeError, step: FlowStep) -> FlowError {
    let body = error.response_body();
    let inscription = body.map(is_inscription_error).unwrap_or(false);
    let details = body.map(details_from_body);

    let kind = if inscription {
        ErrorKind::InscriptionProtected
    } else {
        match &error {
            BridgeError::Http { .. } | BridgeError::Transport(_) => ErrorKind::Network,
            BridgeError::InvalidResponse(_) | BridgeError::Other(_) => ErrorKind::Unknown,
        }
    };

    let message = if inscription {
        INSCRIPTION_MESSAGE.to_string()
    } else {
        match &error {
            BridgeError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    };

    FlowError {
        step,
        kind,
        message,
        details,
        is_inscription_error: inscription,
        cause: Some(error),
    }
}

/// Body as JSON when it parses, otherwise as a JSON string
fn details_from_body(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|_| serde_json::Value::String(body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_error(status: u16, body: &str) -> BridgeError {
        BridgeError::Http {
            status,
            message: "Bad Request".to_string(),
            body: Some(body.to_string()),
        }
    }

    #[test]
    fn test_inscription_error_detected() {
        let body = r#"{"error":"Insufficient funds after filtering out UTXOs with inscriptions","required":51200,"available":800}"#;
        let err = classify(http_error(400, body), FlowStep::PrepareTransaction);

        assert!(err.is_inscription_error);
        assert_eq!(err.kind, ErrorKind::InscriptionProtected);
        assert_eq!(err.step, FlowStep::PrepareTransaction);
        assert_eq!(err.message, INSCRIPTION_MESSAGE);
        assert!(err.remediation().is_some());
        assert_eq!(err.details.as_ref().unwrap()["required"], 51200);
        assert!(matches!(err.cause, Some(BridgeError::Http { status: 400, .. })));
    }

    #[test]
    fn test_inscription_error_in_plain_text_body() {
        let body = "Error: Insufficient funds after filtering. 3 UTXOs with inscriptions skipped";
        let err = classify(http_error(500, body), FlowStep::PrepareTransaction);

        assert!(err.is_inscription_error);
        assert_eq!(err.details, Some(serde_json::Value::String(body.to_string())));
    }

    #[test]
    fn test_both_markers_required() {
        let only_funds = classify(
            http_error(400, r#"{"error":"Insufficient funds after filtering"}"#),
            FlowStep::PrepareTransaction,
        );
        assert!(!only_funds.is_inscription_error);
        assert_eq!(only_funds.kind, ErrorKind::Network);

        let only_inscriptions = classify(
            http_error(400, r#"{"error":"skipped UTXOs with inscriptions"}"#),
            FlowStep::PrepareTransaction,
        );
        assert!(!only_inscriptions.is_inscription_error);
    }

    #[test]
    fn test_markers_outside_body_ignored() {
        let err = classify(
            BridgeError::Other(
                "Insufficient funds after filtering UTXOs with inscriptions".to_string(),
            ),
            FlowStep::PrepareTransaction,
        );
        assert!(!err.is_inscription_error);
        assert_eq!(err.kind, ErrorKind::Unknown);
    }

    #[test]
    fn test_network_errors_keep_backend_message() {
        let err = classify(
            BridgeError::Http {
                status: 503,
                message: "bridge is under maintenance".to_string(),
                body: None,
            },
            FlowStep::CreateDeposit,
        );
        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(err.step, FlowStep::CreateDeposit);
        assert_eq!(err.message, "bridge is under maintenance");
        assert!(err.details.is_none());

        let transport = classify(
            BridgeError::Transport("connection refused".to_string()),
            FlowStep::ExecuteTransaction,
        );
        assert_eq!(transport.kind, ErrorKind::Network);
        assert!(transport.message.contains("connection refused"));
    }

    #[test]
    fn test_unknown_errors() {
        let err = classify(
            BridgeError::InvalidResponse("missing txid".to_string()),
            FlowStep::ExecuteTransaction,
        );
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert!(!err.kind.is_retryable());
        assert!(err.cause.is_some());
    }
}
