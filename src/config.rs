//! Environment-based Configuration
//!
//! # Environment Variables
//!
//! - `BRIDGE_NETWORK` - "mainnet" or "testnet" (default: "mainnet").
//!   Deposits are mainnet-only: the flow accepts `SP` Stacks receivers and
//!   `bc1`/`1`/`3` Bitcoin senders, so testnet only serves fee lookups.
//! - `BRIDGE_CACHE_URL` - Bridge service base URL (default: per network)
//! - `BRIDGE_MIN_BTC` - Minimum deposit in BTC (default: 0.0001)
//! - `BRIDGE_MAX_BTC` - Maximum deposit in BTC (default: 0.002)
//! - `BRIDGE_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `BRIDGE_RESUME_DB` - SQLite file for resumable deposits
//!   (default: "./data/deposit-resume.db")
//! - `BRIDGE_LOG_LEVEL` - Logging level (default: "info")
//! - `BRIDGE_LOG_JSON` - Set to "1" for JSON logs

use std::env;
use std::str::FromStr;
use thiserror::Error;

use bitcoin::address::{Address, NetworkUnchecked};

use crate::bridge::http::{MAINNET_URL, TESTNET_URL};
use crate::types::deposit::{AmountLimits, MAX_BTC_AMOUNT, MIN_BTC_AMOUNT};
use crate::types::units::sats_to_display;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RESUME_DB: &str = "./data/deposit-resume.db";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("invalid amount limits: {0}")]
    InvalidLimits(String),

    #[error("{0}")]
    Unsupported(String),
}

/// Bitcoin / Stacks network pair the bridge serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            _ => Err(ConfigError::InvalidValue(
                "BRIDGE_NETWORK".to_string(),
                format!("unknown network: {}", s),
            )),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

impl Network {
    /// Default bridge-cache URL for this network
    pub fn default_bridge_url(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_URL,
            Network::Testnet => TESTNET_URL,
        }
    }

    /// Get bitcoin network enum
    pub fn bitcoin_network(&self) -> bitcoin::Network {
        match self {
            Network::Mainnet => bitcoin::Network::Bitcoin,
            Network::Testnet => bitcoin::Network::Testnet,
        }
    }

    /// Whether deposits can run on this network
    pub fn supports_deposits(&self) -> bool {
        matches!(self, Network::Mainnet)
    }

    /// Whether `address` parses as a Bitcoin address for this network.
    ///
    /// Stricter than the prefix check the flow applies; used by the CLI
    /// to warn before anything is registered.
    pub fn accepts_btc_address(&self, address: &str) -> bool {
        address
            .parse::<Address<NetworkUnchecked>>()
            .map(|parsed| parsed.is_valid_for_network(self.bitcoin_network()))
            .unwrap_or(false)
    }
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Network environment
    pub network: Network,

    /// Bridge-cache base URL
    pub bridge_url: String,

    /// Accepted deposit range
    pub limits: AmountLimits,

    /// Per-request HTTP timeout
    pub http_timeout_secs: u64,

    /// SQLite file holding resumable deposits
    pub resume_db_path: String,

    /// Log level
    pub log_level: String,

    /// Emit JSON logs
    pub log_json: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let network = Network::Mainnet;
        Self {
            network,
            bridge_url: network.default_bridge_url().to_string(),
            limits: AmountLimits::default(),
            http_timeout_secs: DEFAULT_TIMEOUT_SECS,
            resume_db_path: DEFAULT_RESUME_DB.to_string(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network: Network = lookup("BRIDGE_NETWORK")
            .unwrap_or_else(|| "mainnet".to_string())
            .parse()?;

        let bridge_url = lookup("BRIDGE_CACHE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| network.default_bridge_url().to_string());

        let min_btc = parse_or("BRIDGE_MIN_BTC", lookup("BRIDGE_MIN_BTC"), MIN_BTC_AMOUNT)?;
        let max_btc = parse_or("BRIDGE_MAX_BTC", lookup("BRIDGE_MAX_BTC"), MAX_BTC_AMOUNT)?;
        let limits = validate_limits(min_btc, max_btc)?;

        let http_timeout_secs = parse_or(
            "BRIDGE_HTTP_TIMEOUT_SECS",
            lookup("BRIDGE_HTTP_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;
        if http_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "BRIDGE_HTTP_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let resume_db_path =
            lookup("BRIDGE_RESUME_DB").unwrap_or_else(|| DEFAULT_RESUME_DB.to_string());

        let log_level = lookup("BRIDGE_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_json = lookup("BRIDGE_LOG_JSON").map(|v| v == "1").unwrap_or(false);

        Ok(Self {
            network,
            bridge_url,
            limits,
            http_timeout_secs,
            resume_db_path,
            log_level,
            log_json,
        })
    }

    /// Fail early when the configured network cannot run a deposit
    pub fn ensure_deposits_supported(&self) -> Result<(), ConfigError> {
        if self.network.supports_deposits() {
            return Ok(());
        }
        Err(ConfigError::Unsupported(format!(
            "deposits are mainnet-only (SP receivers, bc1/1/3 senders); \
             {} can only be used for fee lookups",
            self.network
        )))
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("=== Bridge Deposit Configuration ===");
        println!("Network: {}", self.network);
        println!("Bridge URL: {}", self.bridge_url);
        println!(
            "Amount Limits: {} - {}",
            sats_to_display(self.limits.min_sats()),
            sats_to_display(self.limits.max_sats())
        );
        println!("HTTP Timeout: {}s", self.http_timeout_secs);
        println!("Resume DB: {}", self.resume_db_path);
        println!("Log Level: {}", self.log_level);
        println!("====================================");
    }
}

fn parse_or<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| {
            ConfigError::InvalidValue(name.to_string(), format!("cannot parse '{}'", value))
        }),
    }
}

fn validate_limits(min_btc: f64, max_btc: f64) -> Result<AmountLimits, ConfigError> {
    if !min_btc.is_finite() || !max_btc.is_finite() {
        return Err(ConfigError::InvalidLimits(
            "limits must be finite numbers".to_string(),
        ));
    }
    if min_btc <= 0.0 {
        return Err(ConfigError::InvalidLimits(format!(
            "minimum must be positive, got {}",
            min_btc
        )));
    }
    if AmountLimits::new(min_btc, max_btc).min_sats() < 1 {
        return Err(ConfigError::InvalidLimits(format!(
            "minimum {} BTC is below one satoshi",
            min_btc
        )));
    }
    if min_btc > max_btc {
        return Err(ConfigError::InvalidLimits(format!(
            "minimum {} exceeds maximum {}",
            min_btc, max_btc
        )));
    }
    Ok(AmountLimits::new(min_btc, max_btc))
}
