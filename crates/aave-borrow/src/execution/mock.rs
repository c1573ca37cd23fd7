//! In-memory market for tests.
//!
//! Simulates native/ERC-20 balances, allowances, a Chainlink feed and an
//! Aave V2 pool whose account data is denominated in ETH. Every call is
//! appended to a log; state-changing calls append a `Confirmed` entry right
//! before they return, so tests can assert what was confirmed when.

use alloy::primitives::{address, Address, B256, I256, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::errors::BorrowError;
use crate::execution::market::{
    Erc20, LendingPool, NativeWrapper, PoolLocator, PriceFeed, TxConfirmation,
};
use crate::types::{RawAccountData, RoundData};

pub const ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
pub const DAI: Address = address!("6B175474E89094C44Da98b954EedeAC495271d0F");
pub const FEED: Address = address!("773616E4d11A78F511299002da57A0a94577F1f4");
pub const ADDRESSES_PROVIDER: Address = address!("B53C1a33016B2DC2fF3653530bfF1848a515c8c5");
pub const POOL: Address = address!("7d2768dE32b0b80b7a3454c06BdAc94A69DDc7A9");

const WAD: u128 = 1_000_000_000_000_000_000;
const BPS: u64 = 10_000;

/// One observed interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Wrap { value: U256 },
    Approve { token: Address, spender: Address, amount: U256 },
    BalanceOf { token: Address },
    LatestRoundData,
    ResolvePool,
    Deposit { asset: Address, amount: U256 },
    Borrow { asset: Address, amount: U256, mode: U256 },
    Repay { asset: Address, amount: U256, mode: U256 },
    AccountData,
    Confirmed(&'static str),
}

/// Failure switches.
#[derive(Debug, Default, Clone, Copy)]
pub struct Faults {
    pub resolve_zero_address: bool,
    pub revert_approve: bool,
    pub revert_borrow: bool,
    pub fail_reads: bool,
}

#[derive(Debug)]
pub struct MockState {
    pub native_balance: U256,
    pub balances: HashMap<(Address, Address), U256>,
    pub allowances: HashMap<(Address, Address, Address), U256>,
    /// WETH held by the pool for `ACCOUNT` (1 WETH = 1 ETH).
    pub collateral: U256,
    /// Outstanding DAI debt of `ACCOUNT`.
    pub debt: U256,
    /// ETH price of one DAI, 18 decimals.
    pub price_answer: I256,
    pub price_round: u128,
    pub price_updated_at: u64,
    pub ltv_bps: u64,
    pub liquidation_threshold_bps: u64,
    pub faults: Faults,
    pub calls: Vec<Call>,
    tx_count: u64,
}

impl MockState {
    fn confirm(&mut self, label: &'static str) -> TxConfirmation {
        self.tx_count += 1;
        self.calls.push(Call::Confirmed(label));
        TxConfirmation {
            tx_hash: B256::with_last_byte(self.tx_count as u8),
            block_number: Some(100 + self.tx_count),
            gas_used: 50_000,
        }
    }

    fn debt_eth(&self) -> U256 {
        self.debt * self.price_answer.into_raw() / U256::from(WAD)
    }

    fn max_borrow_eth(&self) -> U256 {
        self.collateral * U256::from(self.ltv_bps) / U256::from(BPS)
    }

    fn balance(&self, token: Address, owner: Address) -> U256 {
        self.balances.get(&(token, owner)).copied().unwrap_or_default()
    }

    /// Move `amount` of `token` from `owner` into the pool, spending allowance.
    fn pull(&mut self, token: Address, owner: Address, amount: U256, action: &str) -> Result<(), BorrowError> {
        let allowance = self
            .allowances
            .get(&(token, owner, POOL))
            .copied()
            .unwrap_or_default();
        if allowance < amount {
            return Err(BorrowError::TxReverted {
                action: action.into(),
                reason: "ERC20: transfer amount exceeds allowance".into(),
            });
        }
        let balance = self.balance(token, owner);
        if balance < amount {
            return Err(BorrowError::TxReverted {
                action: action.into(),
                reason: "ERC20: transfer amount exceeds balance".into(),
            });
        }
        self.allowances.insert((token, owner, POOL), allowance - amount);
        self.balances.insert((token, owner), balance - amount);
        Ok(())
    }
}

/// Market double; `bind_pool` hands out pools sharing the same state.
#[derive(Clone)]
pub struct MockMarket {
    pub state: Arc<Mutex<MockState>>,
}

impl MockMarket {
    /// 100 ETH in the wallet, LTV 80%, DAI at 0.0005 ETH.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                native_balance: U256::from(100u64) * U256::from(WAD),
                balances: HashMap::new(),
                allowances: HashMap::new(),
                collateral: U256::ZERO,
                debt: U256::ZERO,
                price_answer: I256::from_raw(U256::from(500_000_000_000_000u64)),
                price_round: 7,
                price_updated_at: 1_700_000_000,
                ltv_bps: 8_000,
                liquidation_threshold_bps: 8_250,
                faults: Faults::default(),
                calls: Vec::new(),
                tx_count: 0,
            })),
        }
    }

    pub fn with_faults(self, faults: Faults) -> Self {
        self.state.lock().unwrap().faults = faults;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn allowance(&self, token: Address, spender: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .allowances
            .get(&(token, ACCOUNT, spender))
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Erc20 for MockMarket {
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxConfirmation, BorrowError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::Approve { token, spender, amount });
        if s.faults.revert_approve {
            return Err(BorrowError::ApprovalFailed {
                token: token.to_string(),
                spender: spender.to_string(),
                reason: "execution reverted".into(),
            });
        }
        s.allowances.insert((token, ACCOUNT, spender), amount);
        Ok(s.confirm("approve"))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, BorrowError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::BalanceOf { token });
        Ok(s.balance(token, owner))
    }
}

#[async_trait]
impl NativeWrapper for MockMarket {
    async fn wrap(&self, token: Address, value: U256) -> Result<TxConfirmation, BorrowError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::Wrap { value });
        if s.native_balance < value {
            return Err(BorrowError::TxReverted {
                action: "wrap".into(),
                reason: "insufficient funds for transfer".into(),
            });
        }
        s.native_balance -= value;
        let balance = s.balance(token, ACCOUNT);
        s.balances.insert((token, ACCOUNT), balance + value);
        Ok(s.confirm("wrap"))
    }
}

#[async_trait]
impl PriceFeed for MockMarket {
    async fn latest_round_data(&self, _feed: Address) -> Result<RoundData, BorrowError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::LatestRoundData);
        if s.faults.fail_reads {
            return Err(BorrowError::ReadFailed {
                call: "latestRoundData".into(),
                reason: "connection refused".into(),
            });
        }
        Ok(RoundData {
            round_id: s.price_round,
            answer: s.price_answer,
            started_at: s.price_updated_at,
            updated_at: s.price_updated_at,
            answered_in_round: s.price_round,
        })
    }
}

#[async_trait]
impl PoolLocator for MockMarket {
    type Pool = MockPool;

    async fn lending_pool_address(
        &self,
        _addresses_provider: Address,
    ) -> Result<Address, BorrowError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::ResolvePool);
        if s.faults.resolve_zero_address {
            Ok(Address::ZERO)
        } else {
            Ok(POOL)
        }
    }

    fn bind_pool(&self, pool: Address) -> MockPool {
        MockPool {
            address: pool,
            state: Arc::clone(&self.state),
        }
    }
}

pub struct MockPool {
    address: Address,
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl LendingPool for MockPool {
    fn address(&self) -> Address {
        self.address
    }

    async fn deposit(
        &self,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        _referral_code: u16,
    ) -> Result<TxConfirmation, BorrowError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::Deposit { asset, amount });
        s.pull(asset, on_behalf_of, amount, "deposit")?;
        s.collateral += amount;
        Ok(s.confirm("deposit"))
    }

    async fn borrow(
        &self,
        asset: Address,
        amount: U256,
        interest_rate_mode: U256,
        _referral_code: u16,
        on_behalf_of: Address,
    ) -> Result<TxConfirmation, BorrowError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::Borrow {
            asset,
            amount,
            mode: interest_rate_mode,
        });

        let value_eth = amount * s.price_answer.into_raw() / U256::from(WAD);
        if s.faults.revert_borrow || s.debt_eth() + value_eth > s.max_borrow_eth() {
            // VL_COLLATERAL_CANNOT_COVER_NEW_BORROW
            return Err(BorrowError::TxReverted {
                action: "borrow".into(),
                reason: "11".into(),
            });
        }

        s.debt += amount;
        let balance = s.balance(asset, on_behalf_of);
        s.balances.insert((asset, on_behalf_of), balance + amount);
        Ok(s.confirm("borrow"))
    }

    async fn repay(
        &self,
        asset: Address,
        amount: U256,
        interest_rate_mode: U256,
        on_behalf_of: Address,
    ) -> Result<TxConfirmation, BorrowError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::Repay {
            asset,
            amount,
            mode: interest_rate_mode,
        });
        let paid = amount.min(s.debt);
        s.pull(asset, on_behalf_of, paid, "repay")?;
        s.debt -= paid;
        Ok(s.confirm("repay"))
    }

    async fn get_user_account_data(&self, _user: Address) -> Result<RawAccountData, BorrowError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::AccountData);
        if s.faults.fail_reads {
            return Err(BorrowError::ReadFailed {
                call: "getUserAccountData".into(),
                reason: "connection refused".into(),
            });
        }

        let debt_eth = s.debt_eth();
        let health_factor = if debt_eth.is_zero() {
            U256::MAX
        } else {
            s.collateral * U256::from(s.liquidation_threshold_bps) * U256::from(WAD)
                / U256::from(BPS)
                / debt_eth
        };

        Ok(RawAccountData {
            total_collateral_eth: s.collateral,
            total_debt_eth: debt_eth,
            available_borrows_eth: s.max_borrow_eth().saturating_sub(debt_eth),
            current_liquidation_threshold: U256::from(s.liquidation_threshold_bps),
            ltv: U256::from(s.ltv_bps),
            health_factor,
        })
    }
}
