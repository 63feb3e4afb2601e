//! Bridge SDK Interface
//!
//! The bridge service owns UTXO selection, fee computation, signing and
//! broadcast. This crate talks to it only through the four calls on
//! [`BridgeSdk`]. What the bridge returns from `prepare_transaction` and
//! `execute_transaction` is owned by the bridge, so it is modelled as the
//! associated types `Prepared` and `Execution` and never inspected here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::deposit::{DepositId, FeeEstimates, FeePriority, WalletProvider};

/// Raw error returned by a bridge call, before classification
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    #[error("bridge responded with HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        /// Response body as returned by the bridge, if any
        body: Option<String>,
    },

    #[error("bridge request failed: {0}")]
    Transport(String),

    #[error("unexpected bridge response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

impl BridgeError {
    /// HTTP response body attached to this error, if any
    pub fn response_body(&self) -> Option<&str> {
        match self {
            BridgeError::Http { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BridgeError::InvalidResponse(err.to_string())
        } else {
            BridgeError::Transport(err.to_string())
        }
    }
}

/// Anything the bridge hands back after a broadcast
pub trait BroadcastReceipt {
    /// Transaction ID of the broadcast Bitcoin transaction
    fn txid(&self) -> &str;
}

/// Body of the `createDeposit` call. Amount is in BTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepositRequest {
    pub btc_amount: f64,
    pub stx_receiver: String,
    pub btc_sender: String,
}

/// Body of the `prepareTransaction` call. Amount is in satoshis,
/// serialized as a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareTransactionRequest {
    pub amount: String,
    pub user_address: String,
    pub btc_address: String,
    pub fee_priority: FeePriority,
    pub wallet_provider: WalletProvider,
}

impl PrepareTransactionRequest {
    pub fn new(
        amount_sats: u64,
        user_address: impl Into<String>,
        btc_address: impl Into<String>,
        fee_priority: FeePriority,
        wallet_provider: WalletProvider,
    ) -> Self {
        Self {
            amount: amount_sats.to_string(),
            user_address: user_address.into(),
            btc_address: btc_address.into(),
            fee_priority,
            wallet_provider,
        }
    }
}

/// Client for the bridge service
#[cfg_attr(
    test,
    mockall::automock(type Prepared = PreparedTransaction; type Execution = ExecutionResult;)
)]
#[async_trait]
pub trait BridgeSdk: Send + Sync {
    /// Unsigned transaction template, selected inputs and fee
    type Prepared: Send + Sync;

    /// Result of signing and broadcasting a prepared transaction
    type Execution: BroadcastReceipt + Send + Sync;

    /// Current fee rates for each priority tier
    async fn fee_estimates(&self) -> Result<FeeEstimates, BridgeError>;

    /// Register a deposit intent with the bridge
    async fn create_deposit(&self, request: &CreateDepositRequest)
        -> Result<DepositId, BridgeError>;

    /// Select UTXOs and compute fees for the deposit amount
    async fn prepare_transaction(
        &self,
        request: &PrepareTransactionRequest,
    ) -> Result<Self::Prepared, BridgeError>;

    /// Have the wallet sign the prepared transaction and broadcast it
    async fn execute_transaction(
        &self,
        deposit_id: &DepositId,
        prepared: &Self::Prepared,
        wallet_provider: WalletProvider,
        btc_address: &str,
    ) -> Result<Self::Execution, BridgeError>;
}

/// Prepared transaction as returned by the bridge, kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreparedTransaction(serde_json::Value);

impl PreparedTransaction {
    pub fn new(raw: serde_json::Value) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Broadcast result as returned by the bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub txid: String,
    /// Full response body
    pub raw: serde_json::Value,
}

impl ExecutionResult {
    pub fn new(txid: impl Into<String>) -> Self {
        let txid = txid.into();
        let raw = serde_json::json!({ "txid": txid });
        Self { txid, raw }
    }
}

impl BroadcastReceipt for ExecutionResult {
    fn txid(&self) -> &str {
        &self.txid
    }
}
