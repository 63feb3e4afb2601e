//! HTTP Bridge Client
//!
//! [`BridgeSdk`] implementation that talks JSON to the bridge-cache
//! service. Error responses keep their raw body so the classifier can
//! inspect it and a UI can show it.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

use super::sdk::{
    BridgeError, BridgeSdk, CreateDepositRequest, ExecutionResult, PrepareTransactionRequest,
    PreparedTransaction,
};
use crate::config::BridgeConfig;
use crate::types::deposit::{DepositId, FeeEstimates, WalletProvider};

/// Bridge-cache endpoints
pub const MAINNET_URL: &str = "https://bridge-cache.stacks.co/api";
pub const TESTNET_URL: &str = "https://bridge-cache.testnet.stacks.co/api";

/// Bridge HTTP client
#[derive(Debug, Clone)]
pub struct HttpBridgeClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDepositResponse {
    deposit_id: String,
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    #[serde(alias = "txId")]
    txid: String,
}

impl HttpBridgeClient {
    /// Create a new client with custom URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, BridgeError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &BridgeConfig) -> Result<Self, BridgeError> {
        Self::with_timeout(
            &config.bridge_url,
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Turn a non-2xx response into a `BridgeError::Http`, keeping the body
    async fn check(resp: Response) -> Result<Response, BridgeError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.ok().filter(|b| !b.is_empty());
        let message = body
            .as_deref()
            .and_then(message_from_body)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

        Err(BridgeError::Http {
            status: status.as_u16(),
            message,
            body,
        })
    }
}

/// Pull a human-readable message out of a JSON error body
pub(crate) fn message_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message", "detail"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[async_trait]
impl BridgeSdk for HttpBridgeClient {
    type Prepared = PreparedTransaction;
    type Execution = ExecutionResult;

    async fn fee_estimates(&self) -> Result<FeeEstimates, BridgeError> {
        let resp = self.client.get(self.url("fee-estimates")).send().await?;
        let fees: FeeEstimates = Self::check(resp).await?.json().await?;
        Ok(fees)
    }

    async fn create_deposit(
        &self,
        request: &CreateDepositRequest,
    ) -> Result<DepositId, BridgeError> {
        let resp = self
            .client
            .post(self.url("deposits"))
            .json(request)
            .send()
            .await?;

        let created: CreateDepositResponse = Self::check(resp).await?.json().await?;
        Ok(DepositId::new(created.deposit_id))
    }

    async fn prepare_transaction(
        &self,
        request: &PrepareTransactionRequest,
    ) -> Result<PreparedTransaction, BridgeError> {
        let resp = self
            .client
            .post(self.url("transactions/prepare"))
            .json(request)
            .send()
            .await?;

        let raw: serde_json::Value = Self::check(resp).await?.json().await?;
        Ok(PreparedTransaction::new(raw))
    }

    async fn execute_transaction(
        &self,
        deposit_id: &DepositId,
        prepared: &PreparedTransaction,
        wallet_provider: WalletProvider,
        btc_address: &str,
    ) -> Result<ExecutionResult, BridgeError> {
        let body = serde_json::json!({
            "depositId": deposit_id,
            "preparedData": prepared,
            "walletProvider": wallet_provider,
            "btcAddress": btc_address,
        });

        let resp = self
            .client
            .post(self.url("transactions/execute"))
            .json(&body)
            .send()
            .await?;

        let raw: serde_json::Value = Self::check(resp).await?.json().await?;
        let parsed: ExecuteResponse = serde_json::from_value(raw.clone())
            .map_err(|e| BridgeError::InvalidResponse(format!("missing txid: {}", e)))?;

        Ok(ExecutionResult {
            txid: parsed.txid,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;

    #[test]
    fn test_client_urls() {
        let mainnet = HttpBridgeClient::new(Network::Mainnet.default_bridge_url());
        assert_eq!(mainnet.base_url(), MAINNET_URL);

        let testnet = HttpBridgeClient::new(Network::Testnet.default_bridge_url());
        assert_eq!(testnet.base_url(), TESTNET_URL);

        let custom = HttpBridgeClient::new("http://localhost:8080/api/");
        assert_eq!(custom.base_url(), "http://localhost:8080/api");
        assert_eq!(
            custom.url("/transactions/prepare"),
            "http://localhost:8080/api/transactions/prepare"
        );
    }

    #[test]
    fn test_message_from_body() {
        assert_eq!(
            message_from_body(r#"{"error":"Insufficient funds after filtering"}"#),
            Some("Insufficient funds after filtering".to_string())
        );
        assert_eq!(
            message_from_body(r#"{"message":"deposit limit reached"}"#),
            Some("deposit limit reached".to_string())
        );
        assert_eq!(message_from_body("<html>502</html>"), None);
        assert_eq!(message_from_body(r#"{"code":42}"#), None);
    }

    #[test]
    fn test_execute_response_aliases() {
        let camel: ExecuteResponse = serde_json::from_str(r#"{"txId":"abc"}"#).unwrap();
        assert_eq!(camel.txid, "abc");

        let lower: ExecuteResponse = serde_json::from_str(r#"{"txid":"def","fee":300}"#).unwrap();
        assert_eq!(lower.txid, "def");
    }

    #[tokio::test]
    async fn test_unreachable_bridge_is_transport_error() {
        let client =
            HttpBridgeClient::with_timeout("http://127.0.0.1:9", Duration::from_millis(500))
                .unwrap();

        let err = client.fee_estimates().await.unwrap_err();
        assert!(matches!(err, BridgeError::Transport(_)));
    }
}
