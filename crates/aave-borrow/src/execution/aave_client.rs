//! Live Aave V2 / ERC-20 / Chainlink client over an Alloy provider.
//!
//! The provider carries the signing wallet, so every state-changing call is
//! signed by `account` and submitted through the same RPC endpoint used for
//! reads. Sends wait for the configured number of confirmations and check
//! the receipt status before returning.

use alloy::contract::Error as ContractError;
use alloy::network::Ethereum;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::errors::BorrowError;
use crate::execution::market::{
    Erc20, LendingPool, NativeWrapper, PoolLocator, PriceFeed, TxConfirmation,
};
use crate::execution::revert::describe_contract_error;
use crate::types::{RawAccountData, RoundData};

use super::contracts::{
    IAggregatorV3, ILendingPool, ILendingPoolAddressesProvider, IERC20, IWETH,
};

/// Concrete provider type: type-erased HTTP provider with a signing wallet.
pub type HttpProvider = DynProvider;

/// Signs and sends as `account`; reads through the same provider.
#[derive(Clone)]
pub struct AaveClient {
    provider: HttpProvider,
    account: Address,
    confirmations: u64,
}

impl AaveClient {
    pub fn new(provider: HttpProvider, account: Address, confirmations: u64) -> Self {
        Self {
            provider,
            account,
            confirmations,
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    /// `decimals()` of a Chainlink feed, used to cross-check configuration.
    pub async fn feed_decimals(&self, feed: Address) -> Result<u8, BorrowError> {
        IAggregatorV3::new(feed, self.provider.clone())
            .decimals()
            .call()
            .await
            .map_err(|e| read_failed("decimals", &e))
    }
}

#[async_trait]
impl Erc20 for AaveClient {
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxConfirmation, BorrowError> {
        let sent = IERC20::new(token, self.provider.clone())
            .approve(spender, amount)
            .send()
            .await;
        confirm("approve", sent, self.confirmations)
            .await
            .map_err(|e| BorrowError::ApprovalFailed {
                token: token.to_string(),
                spender: spender.to_string(),
                reason: e.to_string(),
            })
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, BorrowError> {
        IERC20::new(token, self.provider.clone())
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| read_failed("balanceOf", &e))
    }
}

#[async_trait]
impl NativeWrapper for AaveClient {
    async fn wrap(&self, token: Address, value: U256) -> Result<TxConfirmation, BorrowError> {
        let sent = IWETH::new(token, self.provider.clone())
            .deposit()
            .value(value)
            .send()
            .await;
        confirm("wrap", sent, self.confirmations).await
    }
}

#[async_trait]
impl PriceFeed for AaveClient {
    async fn latest_round_data(&self, feed: Address) -> Result<RoundData, BorrowError> {
        let round = IAggregatorV3::new(feed, self.provider.clone())
            .latestRoundData()
            .call()
            .await
            .map_err(|e| read_failed("latestRoundData", &e))?;

        Ok(RoundData {
            round_id: round.roundId.to::<u128>(),
            answer: round.answer,
            started_at: round.startedAt.saturating_to(),
            updated_at: round.updatedAt.saturating_to(),
            answered_in_round: round.answeredInRound.to::<u128>(),
        })
    }
}

#[async_trait]
impl PoolLocator for AaveClient {
    type Pool = AavePool;

    async fn lending_pool_address(
        &self,
        addresses_provider: Address,
    ) -> Result<Address, BorrowError> {
        ILendingPoolAddressesProvider::new(addresses_provider, self.provider.clone())
            .getLendingPool()
            .call()
            .await
            .map_err(|e| read_failed("getLendingPool", &e))
    }

    fn bind_pool(&self, pool: Address) -> AavePool {
        AavePool {
            pool: ILendingPool::new(pool, self.provider.clone()),
            confirmations: self.confirmations,
        }
    }
}

/// A resolved Aave V2 LendingPool.
pub struct AavePool {
    pool: ILendingPool::ILendingPoolInstance<HttpProvider>,
    confirmations: u64,
}

#[async_trait]
impl LendingPool for AavePool {
    fn address(&self) -> Address {
        *self.pool.address()
    }

    async fn deposit(
        &self,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        referral_code: u16,
    ) -> Result<TxConfirmation, BorrowError> {
        let sent = self
            .pool
            .deposit(asset, amount, on_behalf_of, referral_code)
            .send()
            .await;
        confirm("deposit", sent, self.confirmations).await
    }

    async fn borrow(
        &self,
        asset: Address,
        amount: U256,
        interest_rate_mode: U256,
        referral_code: u16,
        on_behalf_of: Address,
    ) -> Result<TxConfirmation, BorrowError> {
        let sent = self
            .pool
            .borrow(asset, amount, interest_rate_mode, referral_code, on_behalf_of)
            .send()
            .await;
        confirm("borrow", sent, self.confirmations).await
    }

    async fn repay(
        &self,
        asset: Address,
        amount: U256,
        interest_rate_mode: U256,
        on_behalf_of: Address,
    ) -> Result<TxConfirmation, BorrowError> {
        let sent = self
            .pool
            .repay(asset, amount, interest_rate_mode, on_behalf_of)
            .send()
            .await;
        confirm("repay", sent, self.confirmations).await
    }

    async fn get_user_account_data(&self, user: Address) -> Result<RawAccountData, BorrowError> {
        let data = self
            .pool
            .getUserAccountData(user)
            .call()
            .await
            .map_err(|e| read_failed("getUserAccountData", &e))?;

        Ok(RawAccountData {
            total_collateral_eth: data.totalCollateralETH,
            total_debt_eth: data.totalDebtETH,
            available_borrows_eth: data.availableBorrowsETH,
            current_liquidation_threshold: data.currentLiquidationThreshold,
            ltv: data.ltv,
            health_factor: data.healthFactor,
        })
    }
}

/// Wait for a sent transaction to reach `confirmations` blocks and check
/// that it succeeded.
async fn confirm(
    action: &str,
    sent: Result<PendingTransactionBuilder<Ethereum>, ContractError>,
    confirmations: u64,
) -> Result<TxConfirmation, BorrowError> {
    let pending = sent.map_err(|e| BorrowError::TxReverted {
        action: action.into(),
        reason: describe_contract_error(&e),
    })?;
    let tx_hash = *pending.tx_hash();
    debug!(action, %tx_hash, confirmations, "transaction sent");

    let receipt = pending
        .with_required_confirmations(confirmations)
        .get_receipt()
        .await
        .map_err(|e| BorrowError::TxReverted {
            action: action.into(),
            reason: format!("{tx_hash}: {e}"),
        })?;

    if !receipt.status() {
        return Err(BorrowError::TxReverted {
            action: action.into(),
            reason: format!("{tx_hash} reverted on-chain"),
        });
    }

    info!(
        action,
        %tx_hash,
        block = ?receipt.block_number,
        gas_used = receipt.gas_used,
        "transaction confirmed"
    );
    Ok(TxConfirmation {
        tx_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
    })
}

fn read_failed(call: &str, err: &ContractError) -> BorrowError {
    BorrowError::ReadFailed {
        call: call.into(),
        reason: describe_contract_error(err),
    }
}
