use alloy::primitives::Address;
use tracing::info;

use crate::errors::BorrowError;
use crate::execution::market::LendingPool;
use crate::types::AccountPosition;

/// Read `account`'s aggregate position from the pool. Pure read.
pub async fn get_borrow_user_data<P: LendingPool + ?Sized>(
    pool: &P,
    account: Address,
) -> Result<AccountPosition, BorrowError> {
    let raw = pool.get_user_account_data(account).await?;
    let position = AccountPosition::try_from(raw)?;

    info!(
        %account,
        collateral_eth = %position.total_collateral,
        debt_eth = %position.total_debt,
        available_borrows_eth = %position.available_borrow_capacity,
        health_factor = ?position.health_factor,
        "account position"
    );
    Ok(position)
}
