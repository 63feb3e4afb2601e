//! Deposit Registrar
//!
//! Registers the deposit intent with the bridge. This is the only step
//! with a lasting side effect on the bridge: registering twice tracks two
//! deposits.

use crate::bridge::sdk::{BridgeSdk, CreateDepositRequest};
use crate::deposit_flow::classifier::classify;
use crate::types::deposit::{DepositIntent, DepositRegistration};
use crate::types::flow::{ErrorKind, FlowError, FlowStep};

/// Register `intent` and return the bridge's deposit ID.
///
/// The bridge receives the amount in BTC.
pub async fn create_deposit<S>(
    sdk: &S,
    intent: &DepositIntent,
) -> Result<DepositRegistration, FlowError>
where
    S: BridgeSdk + ?Sized,
{
    let request = CreateDepositRequest {
        btc_amount: intent.btc_amount,
        stx_receiver: intent.stx_receiver.clone(),
        btc_sender: intent.btc_sender.clone(),
    };

    tracing::debug!(
        target: "bridge_deposit::flow",
        btc_amount = intent.btc_amount,
        stx_receiver = %intent.stx_receiver,
        btc_sender = %intent.btc_sender,
        "Registering deposit"
    );

    let deposit_id = sdk
        .create_deposit(&request)
        .await
        .map_err(|e| classify(e, FlowStep::CreateDeposit))?;

    if deposit_id.as_str().is_empty() {
        return Err(FlowError {
            step: FlowStep::CreateDeposit,
            kind: ErrorKind::Unknown,
            message: "Bridge returned an empty deposit ID".to_string(),
            cause: None,
            details: None,
            is_inscription_error: false,
        });
    }

    tracing::info!(
        target: "bridge_deposit::flow",
        deposit_id = %deposit_id,
        "Deposit registered"
    );

    Ok(DepositRegistration { deposit_id })
}
