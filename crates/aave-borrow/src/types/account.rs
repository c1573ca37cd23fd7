use alloy::primitives::{I256, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::BorrowError;
use crate::types::amount::Amount;

/// Basis-point values (`7500` = 75%) are 4-decimal fixed point.
const BPS_DECIMALS: u8 = 4;

/// Raw result of `LendingPool.getUserAccountData()` (Aave V2: ETH-denominated,
/// 18 decimals; ratios in basis points; health factor in WAD).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAccountData {
    pub total_collateral_eth: U256,
    pub total_debt_eth: U256,
    pub available_borrows_eth: U256,
    pub current_liquidation_threshold: U256,
    pub ltv: U256,
    pub health_factor: U256,
}

/// Snapshot of an account's aggregate position, in ETH.
///
/// A new read is needed to observe the effect of any later transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPosition {
    #[serde(with = "rust_decimal::serde::str")]
    pub total_collateral: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_debt: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub available_borrow_capacity: Decimal,
    /// Weighted liquidation threshold as a fraction.
    #[serde(with = "rust_decimal::serde::str")]
    pub current_liquidation_threshold: Decimal,
    /// Weighted LTV as a fraction.
    #[serde(with = "rust_decimal::serde::str")]
    pub ltv: Decimal,
    /// `None` while the account has no debt (on-chain `uint256::MAX`).
    #[serde(with = "rust_decimal::serde::str_option")]
    pub health_factor: Option<Decimal>,
}

impl TryFrom<RawAccountData> for AccountPosition {
    type Error = BorrowError;

    fn try_from(raw: RawAccountData) -> Result<Self, Self::Error> {
        let health_factor = if raw.health_factor == U256::MAX {
            None
        } else {
            Some(Amount::wad(raw.health_factor).to_decimal()?)
        };

        Ok(Self {
            total_collateral: Amount::wad(raw.total_collateral_eth).to_decimal()?,
            total_debt: Amount::wad(raw.total_debt_eth).to_decimal()?,
            available_borrow_capacity: Amount::wad(raw.available_borrows_eth).to_decimal()?,
            current_liquidation_threshold: Amount::from_raw(
                raw.current_liquidation_threshold,
                BPS_DECIMALS,
            )
            .to_decimal()?,
            ltv: Amount::from_raw(raw.ltv, BPS_DECIMALS).to_decimal()?,
            health_factor,
        })
    }
}

/// Raw result of `AggregatorV3Interface.latestRoundData()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundData {
    pub round_id: u128,
    pub answer: I256,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: u128,
}

/// One price read: debt-asset price in collateral-asset units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub round_id: u128,
    pub updated_at: u64,
}
