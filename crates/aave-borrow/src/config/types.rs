use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_CONFIRMATIONS, DEFAULT_DEBT_DUST_THRESHOLD, DEFAULT_SAFETY_MARGIN, DEFAULT_WRAP_AMOUNT,
};

// ---------------------------------------------------------------------------
// Top-level aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    pub app: AppConfig,
    pub chain: ChainConfig,
    pub borrow: BorrowConfig,
    /// Env vars that replaced JSON values during loading.
    #[serde(skip)]
    pub env_overrides: Vec<&'static str>,
}

// ---------------------------------------------------------------------------
// app.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    #[serde(default = "default_log_file")]
    pub file_name: String,
    #[serde(default = "default_filter")]
    pub default_filter: String,
}

fn default_log_file() -> String {
    "aave-borrow.log".into()
}

fn default_filter() -> String {
    "aave_borrow=info,warn".into()
}

// ---------------------------------------------------------------------------
// chains/<id>.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub chain_name: String,
    pub rpc: RpcConfig,
    pub contracts: ContractsConfig,
    pub tokens: HashMap<String, TokenConfig>,
    pub price_feeds: HashMap<String, PriceFeedConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    pub http_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    pub lending_pool_addresses_provider: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub address: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceFeedConfig {
    pub address: String,
    pub decimals: u8,
}

// ---------------------------------------------------------------------------
// borrow.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct BorrowConfig {
    /// Key into `chain.tokens`: the wrapped native asset deposited as collateral.
    pub collateral_token: String,
    /// Key into `chain.tokens`: the asset borrowed and repaid.
    pub debt_token: String,
    /// Key into `chain.price_feeds`: debt-asset price in collateral units.
    pub price_feed: String,
    /// Native currency wrapped and deposited, in ETH.
    #[serde(with = "rust_decimal::serde::str", default = "default_wrap_amount")]
    pub wrap_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str", default = "default_safety_margin")]
    pub safety_margin: Decimal,
    #[serde(default)]
    pub referral_code: u16,
    #[serde(default = "default_rate_mode")]
    pub interest_rate_mode: InterestRateMode,
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    /// Residual debt (ETH) tolerated after the final repay.
    #[serde(with = "rust_decimal::serde::str", default = "default_dust")]
    pub debt_dust_threshold: Decimal,
    /// Reject price samples older than this. `None` trusts the latest round as-is.
    #[serde(default)]
    pub max_price_age_seconds: Option<u64>,
}

fn default_wrap_amount() -> Decimal {
    DEFAULT_WRAP_AMOUNT
}

fn default_safety_margin() -> Decimal {
    DEFAULT_SAFETY_MARGIN
}

fn default_rate_mode() -> InterestRateMode {
    InterestRateMode::Stable
}

fn default_confirmations() -> u64 {
    DEFAULT_CONFIRMATIONS
}

fn default_dust() -> Decimal {
    DEFAULT_DEBT_DUST_THRESHOLD
}

/// Aave V2 interest rate mode for `borrow` / `repay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestRateMode {
    Stable,
    Variable,
}

impl InterestRateMode {
    /// On-chain encoding: stable = 1, variable = 2.
    pub fn as_u256(self) -> U256 {
        match self {
            Self::Stable => U256::from(1u8),
            Self::Variable => U256::from(2u8),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Variable => "variable",
        }
    }
}

impl fmt::Display for InterestRateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterestRateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stable" | "1" => Ok(Self::Stable),
            "variable" | "2" => Ok(Self::Variable),
            other => Err(format!("unknown interest rate mode: {other}")),
        }
    }
}
