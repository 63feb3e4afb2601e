//! Transaction Preparer
//!
//! Asks the bridge for fee estimates and an unsigned transaction sized to
//! the deposit. Takes satoshis: the caller converts once, from the same
//! BTC amount that was registered.

use crate::bridge::sdk::{BridgeSdk, PrepareTransactionRequest};
use crate::deposit_flow::classifier::classify;
use crate::types::deposit::{FeeEstimates, FeePriority, WalletProvider};
use crate::types::flow::{FlowError, FlowStep};

/// Fetch current fee tiers from the bridge
pub async fn fetch_fee_estimates<S>(sdk: &S) -> Result<FeeEstimates, FlowError>
where
    S: BridgeSdk + ?Sized,
{
    sdk.fee_estimates()
        .await
        .map_err(|e| classify(e, FlowStep::PrepareTransaction))
}

/// Prepare an unsigned deposit transaction for `amount_sats`
pub async fn prepare_transaction<S>(
    sdk: &S,
    amount_sats: u64,
    user_address: &str,
    btc_address: &str,
    fee_priority: FeePriority,
    wallet_provider: WalletProvider,
) -> Result<S::Prepared, FlowError>
where
    S: BridgeSdk + ?Sized,
{
    let request = PrepareTransactionRequest::new(
        amount_sats,
        user_address,
        btc_address,
        fee_priority,
        wallet_provider,
    );

    tracing::debug!(
        target: "bridge_deposit::flow",
        amount_sats,
        fee_priority = %fee_priority,
        wallet = %wallet_provider,
        "Preparing transaction"
    );

    match sdk.prepare_transaction(&request).await {
        Ok(prepared) => Ok(prepared),
        Err(e) => {
            let err = classify(e, FlowStep::PrepareTransaction);
            if err.is_inscription_error {
                tracing::warn!(
                    target: "bridge_deposit::flow",
                    btc_address,
                    amount_sats,
                    "Spendable balance locked in inscription UTXOs"
                );
            }
            Err(err)
        }
    }
}
