//! Input Validator
//!
//! Shape and bounds checks run before any call to the bridge. Pure and
//! synchronous.

use crate::types::deposit::{AmountLimits, DepositIntent};
use crate::types::flow::FlowError;
use crate::types::units::{btc_to_sats, format_with_commas};

/// Prefix of a mainnet Stacks address
pub const STX_RECEIVER_PREFIX: &str = "SP";

/// Prefixes of Bitcoin mainnet addresses: bech32/bech32m, P2PKH and P2SH
pub const BTC_SENDER_PREFIXES: [&str; 3] = ["bc1", "1", "3"];

/// Check the receiving Stacks address and the funding Bitcoin address
pub fn validate_addresses(stx_receiver: &str, btc_sender: &str) -> Result<(), FlowError> {
    if !stx_receiver.starts_with(STX_RECEIVER_PREFIX) {
        return Err(FlowError::validation(format!(
            "Invalid Stacks address: must start with {}",
            STX_RECEIVER_PREFIX
        )));
    }

    if !BTC_SENDER_PREFIXES
        .iter()
        .any(|prefix| btc_sender.starts_with(prefix))
    {
        return Err(FlowError::validation(
            "Invalid Bitcoin address: must start with bc1, 1 or 3",
        ));
    }

    Ok(())
}

/// Check that `btc_amount` lies within `limits`, inclusive.
///
/// Messages quote the bounds in both BTC and satoshis.
pub fn validate_amount(btc_amount: f64, limits: &AmountLimits) -> Result<(), FlowError> {
    if !btc_amount.is_finite() {
        return Err(FlowError::validation("Amount must be a valid number"));
    }

    if btc_amount < limits.min_btc {
        return Err(FlowError::validation(format!(
            "Minimum amount is {} BTC ({} satoshis)",
            limits.min_btc,
            format_with_commas(limits.min_sats())
        )));
    }

    if btc_amount > limits.max_btc {
        return Err(FlowError::validation(format!(
            "Maximum amount is {} BTC ({} satoshis)",
            limits.max_btc,
            format_with_commas(limits.max_sats())
        )));
    }

    // Limits built in code may allow sub-satoshi amounts; the bridge
    // cannot prepare those, so reject them before anything is registered
    if btc_to_sats(btc_amount) == 0 {
        return Err(FlowError::validation("Amount must be at least 1 satoshi"));
    }

    Ok(())
}

/// Run every check on an intent, addresses first
pub fn validate_intent(intent: &DepositIntent, limits: &AmountLimits) -> Result<(), FlowError> {
    validate_addresses(&intent.stx_receiver, &intent.btc_sender)?;
    validate_amount(intent.btc_amount, limits)
}
