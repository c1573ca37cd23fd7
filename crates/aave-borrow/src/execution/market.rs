//! Typed seams between the borrow flow and the chain.
//!
//! One trait per external contract, each exposing only the calls the flow
//! makes. State-changing methods return once the transaction has reached
//! the configured confirmation depth, never earlier.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::errors::BorrowError;
use crate::types::{RawAccountData, RoundData};

/// Proof that a state-changing call was mined and succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxConfirmation {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// ERC-20 token calls, signed by the account behind the implementation.
#[async_trait]
pub trait Erc20: Send + Sync {
    /// Set `spender`'s allowance on `token` to exactly `amount`.
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxConfirmation, BorrowError>;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, BorrowError>;
}

/// Wraps native currency into its ERC-20 form (WETH).
#[async_trait]
pub trait NativeWrapper: Send + Sync {
    async fn wrap(&self, token: Address, value: U256) -> Result<TxConfirmation, BorrowError>;
}

/// Chainlink-style price feed.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn latest_round_data(&self, feed: Address) -> Result<RoundData, BorrowError>;
}

/// Handle to a resolved lending pool.
#[async_trait]
pub trait LendingPool: Send + Sync {
    fn address(&self) -> Address;

    async fn deposit(
        &self,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        referral_code: u16,
    ) -> Result<TxConfirmation, BorrowError>;

    async fn borrow(
        &self,
        asset: Address,
        amount: U256,
        interest_rate_mode: U256,
        referral_code: u16,
        on_behalf_of: Address,
    ) -> Result<TxConfirmation, BorrowError>;

    async fn repay(
        &self,
        asset: Address,
        amount: U256,
        interest_rate_mode: U256,
        on_behalf_of: Address,
    ) -> Result<TxConfirmation, BorrowError>;

    async fn get_user_account_data(&self, user: Address) -> Result<RawAccountData, BorrowError>;
}

/// Resolves the active pool through the addresses-provider registry.
#[async_trait]
pub trait PoolLocator: Send + Sync {
    type Pool: LendingPool;

    /// Read the pool address from `addresses_provider`.
    async fn lending_pool_address(&self, addresses_provider: Address)
        -> Result<Address, BorrowError>;

    /// Bind a pool handle to an already resolved address.
    fn bind_pool(&self, pool: Address) -> Self::Pool;
}

/// Everything the borrow flow needs from the chain.
pub trait Market: Erc20 + NativeWrapper + PriceFeed + PoolLocator {}

impl<T> Market for T where T: Erc20 + NativeWrapper + PriceFeed + PoolLocator {}
