//! Shared Types Module
//!
//! Data types shared across the deposit pipeline.

pub mod deposit;
pub mod flow;
pub mod units;

// Re-exports for convenience
pub use deposit::{
    AmountLimits, DepositId, DepositIntent, DepositRegistration, FeeEstimates, FeePriority, WalletProvider,
    MAX_BTC_AMOUNT, MIN_BTC_AMOUNT,
};
pub use flow::{
    CompletedDeposit, ErrorKind, FailedDeposit, FlowError, FlowState, FlowStep, ResumePoint,
};
pub use units::{btc_to_sats, format_with_commas, sats_to_btc, sats_to_display, SATS_PER_BTC};
