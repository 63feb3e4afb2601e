//! Bridge Service Module
//!
//! - **sdk**: the `BridgeSdk` trait and its raw error type
//! - **http**: reqwest implementation against the bridge-cache API

pub mod http;
pub mod sdk;

pub use http::HttpBridgeClient;
pub use sdk::{
    BridgeError, BridgeSdk, BroadcastReceipt, CreateDepositRequest, ExecutionResult,
    PrepareTransactionRequest, PreparedTransaction,
};
