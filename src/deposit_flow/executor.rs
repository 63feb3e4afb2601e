//! Transaction Executor
//!
//! Hands the prepared transaction to the bridge, which has the named
//! wallet sign it and broadcasts it. A broadcast either happened or it
//! did not; there is no partial state to report.

use crate::bridge::sdk::BridgeSdk;
use crate::deposit_flow::classifier::classify;
use crate::types::deposit::{DepositId, WalletProvider};
use crate::types::flow::{FlowError, FlowStep};

/// Sign and broadcast `prepared` for the registered deposit
pub async fn execute_transaction<S>(
    sdk: &S,
    deposit_id: &DepositId,
    prepared: &S::Prepared,
    wallet_provider: WalletProvider,
    btc_address: &str,
) -> Result<S::Execution, FlowError>
where
    S: BridgeSdk + ?Sized,
{
    tracing::debug!(
        target: "bridge_deposit::flow",
        deposit_id = %deposit_id,
        wallet = %wallet_provider,
        "Executing transaction"
    );

    sdk.execute_transaction(deposit_id, prepared, wallet_provider, btc_address)
        .await
        .map_err(|e| classify(e, FlowStep::ExecuteTransaction))
}
