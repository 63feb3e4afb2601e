//! Bridge Deposit - BTC → sBTC Deposit Orchestration
//!
//! Drives a Bitcoin deposit through the bridge service:
//!
//! 1. **Validation** - Stacks receiver, Bitcoin sender and amount bounds
//! 2. **Registration** - the bridge assigns a deposit ID
//! 3. **Preparation** - the bridge selects UTXOs and computes fees
//! 4. **Execution** - the wallet signs and the bridge broadcasts
//!
//! UTXO selection, signing and broadcast all happen on the bridge side;
//! this crate validates input, sequences the calls and classifies what
//! goes wrong. A failure after registration can be resumed with the same
//! deposit ID (see [`storage`]).

pub mod bridge;
pub mod config;
pub mod deposit_flow;
pub mod error;
pub mod logging;
pub mod storage;
pub mod types;

// Re-exports: bridge client
pub use bridge::{BridgeError, BridgeSdk, BroadcastReceipt, HttpBridgeClient};

// Re-exports: flow
pub use deposit_flow::{DepositFlow, FlowResult};

// Re-exports: configuration and errors
pub use config::{BridgeConfig, ConfigError, Network};
pub use error::AppError;

// Re-exports: shared types
pub use types::{
    AmountLimits, CompletedDeposit, DepositId, DepositIntent, ErrorKind, FailedDeposit, FeePriority,
    FlowError, FlowStep, ResumePoint, WalletProvider,
};
