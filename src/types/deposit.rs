//! Deposit Types
//!
//! The caller-facing description of a deposit (`DepositIntent`) and the
//! small value types threaded through the registration, preparation and
//! execution phases.

use serde::{Deserialize, Serialize};

use super::units::btc_to_sats;

/// Smallest deposit accepted by the bridge, in BTC
pub const MIN_BTC_AMOUNT: f64 = 0.0001;

/// Largest deposit accepted by the bridge, in BTC
pub const MAX_BTC_AMOUNT: f64 = 0.002;

/// Fee tier requested from the bridge's fee estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeePriority {
    Low,
    Medium,
    High,
}

impl Default for FeePriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for FeePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for FeePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("unknown fee priority: {}", s)),
        }
    }
}

/// Browser wallet that signs the prepared transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletProvider {
    Leather,
    Xverse,
}

impl std::fmt::Display for WalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Leather => "leather",
            Self::Xverse => "xverse",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for WalletProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "leather" => Ok(Self::Leather),
            "xverse" => Ok(Self::Xverse),
            _ => Err(format!("unknown wallet provider: {}", s)),
        }
    }
}

/// Identifier the bridge assigns to a registered deposit.
///
/// Written once by the registrar and only ever read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepositId(String);

impl DepositId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DepositId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of registering a deposit with the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRegistration {
    pub deposit_id: DepositId,
}

/// A user's request to move BTC across the bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositIntent {
    /// Amount in BTC (not satoshis)
    pub btc_amount: f64,
    /// Stacks address credited on the other side of the bridge
    pub stx_receiver: String,
    /// Bitcoin address funding the deposit
    pub btc_sender: String,
    pub fee_priority: FeePriority,
    pub wallet_provider: WalletProvider,
}

impl DepositIntent {
    pub fn new(
        btc_amount: f64,
        stx_receiver: impl Into<String>,
        btc_sender: impl Into<String>,
        fee_priority: FeePriority,
        wallet_provider: WalletProvider,
    ) -> Self {
        Self {
            btc_amount,
            stx_receiver: stx_receiver.into(),
            btc_sender: btc_sender.into(),
            fee_priority,
            wallet_provider,
        }
    }

    /// Satoshi amount derived from `btc_amount`, rounded down
    pub fn amount_sats(&self) -> u64 {
        btc_to_sats(self.btc_amount)
    }
}

/// Inclusive bounds on a deposit amount, in BTC
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountLimits {
    pub min_btc: f64,
    pub max_btc: f64,
}

impl AmountLimits {
    pub fn new(min_btc: f64, max_btc: f64) -> Self {
        Self { min_btc, max_btc }
    }

    pub fn min_sats(&self) -> u64 {
        btc_to_sats(self.min_btc)
    }

    pub fn max_sats(&self) -> u64 {
        btc_to_sats(self.max_btc)
    }

    pub fn contains(&self, btc_amount: f64) -> bool {
        (self.min_btc..=self.max_btc).contains(&btc_amount)
    }
}

impl Default for AmountLimits {
    fn default() -> Self {
        Self::new(MIN_BTC_AMOUNT, MAX_BTC_AMOUNT)
    }
}

/// Fee rates per priority tier, in sat/vB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEstimates {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

impl FeeEstimates {
    pub fn rate_for(&self, priority: FeePriority) -> u64 {
        match priority {
            FeePriority::Low => self.low,
            FeePriority::Medium => self.medium,
            FeePriority::High => self.high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Medium".parse::<FeePriority>(), Ok(FeePriority::Medium));
        assert_eq!("high".parse::<FeePriority>(), Ok(FeePriority::High));
        assert!("urgent".parse::<FeePriority>().is_err());

        assert_eq!("leather".parse::<WalletProvider>(), Ok(WalletProvider::Leather));
        assert_eq!("XVERSE".parse::<WalletProvider>(), Ok(WalletProvider::Xverse));
        assert!("unisat".parse::<WalletProvider>().is_err());
    }

    #[test]
    fn test_intent_serialization() {
        let intent = DepositIntent::new(
            0.0005,
            "SP2FW2AQXTBKYY8DXP18PCXZGWQT4S2RH7HC6WA4H",
            "bc1qexampleaddress",
            FeePriority::Medium,
            WalletProvider::Leather,
        );

        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["btcAmount"], 0.0005);
        assert_eq!(json["feePriority"], "medium");
        assert_eq!(json["walletProvider"], "leather");
        assert_eq!(intent.amount_sats(), 50_000);
    }

    #[test]
    fn test_default_limits() {
        let limits = AmountLimits::default();
        assert_eq!(limits.min_sats(), 10_000);
        assert_eq!(limits.max_sats(), 200_000);
        assert!(limits.contains(MIN_BTC_AMOUNT));
        assert!(limits.contains(MAX_BTC_AMOUNT));
        assert!(!limits.contains(0.00009999));
        assert!(!limits.contains(0.0020001));
        assert!(!limits.contains(f64::NAN));
    }

    #[test]
    fn test_fee_tiers() {
        let fees = FeeEstimates { low: 2, medium: 5, high: 12 };
        assert_eq!(fees.rate_for(FeePriority::Low), 2);
        assert_eq!(fees.rate_for(FeePriority::Medium), 5);
        assert_eq!(fees.rate_for(FeePriority::High), 12);
    }
}
