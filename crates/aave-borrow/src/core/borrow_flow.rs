//! Wrap → deposit → borrow → repay against an Aave V2 lending pool.
//!
//! Each stage depends on the one before it and every state-changing call is
//! confirmed before the next stage starts. The first failure ends the run
//! and is reported together with the stage it happened at; nothing is
//! retried or unwound.
//!
//! Stages:
//! 1. Resolve the lending pool through the addresses provider
//! 2. Wrap native currency into the collateral token
//! 3. Approve the pool for the wrapped amount, then deposit it
//! 4. Read the position, read the price, size the borrow
//! 5. Borrow, read the position again
//! 6. Approve the pool for the borrowed amount, repay it, read a final time

use alloy::primitives::Address;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{InterestRateMode, RunnerConfig};
use crate::errors::BorrowError;
use crate::execution::account::get_borrow_user_data;
use crate::execution::approval::approve_erc20;
use crate::execution::market::{LendingPool, Market, TxConfirmation};
use crate::execution::oracle::get_price;
use crate::execution::pool_locator::get_lending_pool;
use crate::execution::wrap::wrap_native;
use crate::types::{AccountPosition, Amount, Asset, PriceSample};

/// Position of the flow in its fixed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    ResolvePool,
    Wrap,
    ApproveDeposit,
    Deposit,
    ReadPosition1,
    PriceRead,
    ComputeBorrowAmount,
    Borrow,
    ReadPosition2,
    ApproveRepay,
    Repay,
    ReadPosition3,
}

impl FlowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResolvePool => "resolve_pool",
            Self::Wrap => "wrap",
            Self::ApproveDeposit => "approve_deposit",
            Self::Deposit => "deposit",
            Self::ReadPosition1 => "read_position_1",
            Self::PriceRead => "price_read",
            Self::ComputeBorrowAmount => "compute_borrow_amount",
            Self::Borrow => "borrow",
            Self::ReadPosition2 => "read_position_2",
            Self::ApproveRepay => "approve_repay",
            Self::Repay => "repay",
            Self::ReadPosition3 => "read_position_3",
        }
    }
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a run.
#[derive(Debug, Error)]
#[error("borrow flow aborted at {stage}: {source}")]
pub struct FlowAborted {
    pub stage: FlowStage,
    #[source]
    pub source: BorrowError,
}

trait AtStage<T> {
    fn at(self, stage: FlowStage) -> Result<T, FlowAborted>;
}

impl<T> AtStage<T> for Result<T, BorrowError> {
    fn at(self, stage: FlowStage) -> Result<T, FlowAborted> {
        self.map_err(|source| FlowAborted { stage, source })
    }
}

/// Everything one run needs, resolved from configuration up front.
#[derive(Debug, Clone)]
pub struct BorrowPlan {
    pub account: Address,
    pub addresses_provider: Address,
    pub collateral: Asset,
    pub debt: Asset,
    pub price_feed: Address,
    pub price_decimals: u8,
    pub wrap_amount: Decimal,
    pub safety_margin: Decimal,
    pub referral_code: u16,
    pub interest_rate_mode: InterestRateMode,
    pub debt_dust_threshold: Decimal,
    pub max_price_age_seconds: Option<u64>,
}

impl BorrowPlan {
    pub fn from_config(config: &RunnerConfig, account: Address) -> Result<Self, BorrowError> {
        let chain = &config.chain;
        let borrow = &config.borrow;

        let asset = |key: &str| -> Result<Asset, BorrowError> {
            let token = chain
                .tokens
                .get(key)
                .ok_or_else(|| BorrowError::Config(format!("unknown token '{key}'")))?;
            Ok(Asset {
                symbol: key.to_string(),
                address: parse_address(key, &token.address)?,
                decimals: token.decimals,
            })
        };

        let feed = chain.price_feeds.get(&borrow.price_feed).ok_or_else(|| {
            BorrowError::Config(format!("unknown price feed '{}'", borrow.price_feed))
        })?;

        Ok(Self {
            account,
            addresses_provider: parse_address(
                "lending_pool_addresses_provider",
                &chain.contracts.lending_pool_addresses_provider,
            )?,
            collateral: asset(&borrow.collateral_token)?,
            debt: asset(&borrow.debt_token)?,
            price_feed: parse_address(&borrow.price_feed, &feed.address)?,
            price_decimals: feed.decimals,
            wrap_amount: borrow.wrap_amount,
            safety_margin: borrow.safety_margin,
            referral_code: borrow.referral_code,
            interest_rate_mode: borrow.interest_rate_mode,
            debt_dust_threshold: borrow.debt_dust_threshold,
            max_price_age_seconds: borrow.max_price_age_seconds,
        })
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address, BorrowError> {
    value
        .parse()
        .map_err(|e| BorrowError::Config(format!("{field}: invalid address '{value}': {e}")))
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct BorrowReport {
    pub wrapped: Amount,
    pub price: PriceSample,
    pub borrowed: Amount,
    pub after_deposit: AccountPosition,
    pub after_borrow: AccountPosition,
    pub after_repay: AccountPosition,
    /// Residual debt after repay is at or below the dust threshold.
    pub debt_cleared: bool,
    pub transactions: Vec<(FlowStage, TxConfirmation)>,
}

/// Size the borrow: `capacity * margin / price`, in the debt asset's
/// smallest unit, truncated.
///
/// `capacity` and `price` are in collateral units. Multiplying before
/// dividing keeps the rounding to the final conversion.
pub fn compute_borrow_amount(
    capacity: Decimal,
    price: Decimal,
    safety_margin: Decimal,
    debt_decimals: u8,
) -> Result<Amount, BorrowError> {
    if price <= Decimal::ZERO {
        return Err(BorrowError::InvalidPrice {
            answer: price.to_string(),
        });
    }

    let overflow = || BorrowError::AmountOverflow {
        value: format!("{capacity} * {safety_margin} / {price}"),
        decimals: debt_decimals,
    };
    let human = capacity
        .checked_mul(safety_margin)
        .and_then(|scaled| scaled.checked_div(price))
        .ok_or_else(overflow)?;

    let amount = Amount::from_decimal(human, debt_decimals)?;
    if amount.is_zero() {
        return Err(BorrowError::NothingToBorrow {
            capacity: capacity.to_string(),
            price: price.to_string(),
        });
    }
    Ok(amount)
}

/// Process exit code for a finished run.
pub fn exit_code(result: &Result<BorrowReport, FlowAborted>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

/// One sequential run of the flow against `market`.
pub struct BorrowFlow<'a, M: Market> {
    market: &'a M,
    plan: &'a BorrowPlan,
}

impl<'a, M: Market> BorrowFlow<'a, M> {
    pub fn new(market: &'a M, plan: &'a BorrowPlan) -> Self {
        Self { market, plan }
    }

    pub async fn run(&self) -> Result<BorrowReport, FlowAborted> {
        let plan = self.plan;
        let account = plan.account;
        let rate_mode = plan.interest_rate_mode.as_u256();
        let mut transactions = Vec::with_capacity(6);

        info!(
            %account,
            collateral = %plan.collateral,
            debt = %plan.debt,
            wrap_amount = %plan.wrap_amount,
            rate_mode = %plan.interest_rate_mode,
            "starting borrow flow"
        );

        // 1. Resolve pool
        let pool = get_lending_pool(self.market, plan.addresses_provider)
            .await
            .at(FlowStage::ResolvePool)?;

        // 2. Wrap
        let wrapped = wrap_native(self.market, &plan.collateral, plan.wrap_amount, account)
            .await
            .at(FlowStage::Wrap)?;
        transactions.push((FlowStage::Wrap, wrapped.confirmation.clone()));
        let deposit_amount = wrapped.amount;

        // 3. Approve + deposit collateral
        let tx = approve_erc20(
            self.market,
            plan.collateral.address,
            pool.address(),
            deposit_amount.raw(),
        )
        .await
        .at(FlowStage::ApproveDeposit)?;
        transactions.push((FlowStage::ApproveDeposit, tx));

        let tx = pool
            .deposit(
                plan.collateral.address,
                deposit_amount.raw(),
                account,
                plan.referral_code,
            )
            .await
            .at(FlowStage::Deposit)?;
        info!(amount = %deposit_amount, tx = %tx.tx_hash, "collateral deposited");
        transactions.push((FlowStage::Deposit, tx));

        // 4. Size the borrow
        let after_deposit = get_borrow_user_data(&pool, account)
            .await
            .at(FlowStage::ReadPosition1)?;

        let price = get_price(
            self.market,
            plan.price_feed,
            plan.price_decimals,
            plan.max_price_age_seconds,
        )
        .await
        .at(FlowStage::PriceRead)?;

        let borrowed = compute_borrow_amount(
            after_deposit.available_borrow_capacity,
            price.price,
            plan.safety_margin,
            plan.debt.decimals,
        )
        .at(FlowStage::ComputeBorrowAmount)?;

        // 5. Borrow
        let tx = pool
            .borrow(
                plan.debt.address,
                borrowed.raw(),
                rate_mode,
                plan.referral_code,
                account,
            )
            .await
            .at(FlowStage::Borrow)?;
        info!(
            asset = %plan.debt,
            amount = %borrowed,
            tx = %tx.tx_hash,
            "borrowed"
        );
        transactions.push((FlowStage::Borrow, tx));

        let after_borrow = get_borrow_user_data(&pool, account)
            .await
            .at(FlowStage::ReadPosition2)?;

        // 6. Approve + repay
        let tx = approve_erc20(self.market, plan.debt.address, pool.address(), borrowed.raw())
            .await
            .at(FlowStage::ApproveRepay)?;
        transactions.push((FlowStage::ApproveRepay, tx));

        let tx = pool
            .repay(plan.debt.address, borrowed.raw(), rate_mode, account)
            .await
            .at(FlowStage::Repay)?;
        info!(asset = %plan.debt, amount = %borrowed, tx = %tx.tx_hash, "repaid");
        transactions.push((FlowStage::Repay, tx));

        let after_repay = get_borrow_user_data(&pool, account)
            .await
            .at(FlowStage::ReadPosition3)?;

        let debt_cleared = after_repay.total_debt <= plan.debt_dust_threshold;
        if !debt_cleared {
            // Interest accrued between borrow and repay stays as debt.
            warn!(
                residual_debt_eth = %after_repay.total_debt,
                threshold_eth = %plan.debt_dust_threshold,
                "debt remains after repay"
            );
        }

        info!(
            wrapped = %deposit_amount,
            borrowed = %borrowed,
            price = %price.price,
            final_debt_eth = %after_repay.total_debt,
            transactions = transactions.len(),
            "borrow flow complete"
        );

        Ok(BorrowReport {
            wrapped: deposit_amount,
            price,
            borrowed,
            after_deposit,
            after_borrow,
            after_repay,
            debt_cleared,
            transactions,
        })
    }
}
