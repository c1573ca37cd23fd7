use alloy::primitives::Address;
use rust_decimal::Decimal;
use tracing::info;

use crate::errors::BorrowError;
use crate::execution::market::{Erc20, NativeWrapper, TxConfirmation};
use crate::types::{Amount, Asset};

/// Result of wrapping native currency.
#[derive(Debug, Clone)]
pub struct WrapOutcome {
    pub amount: Amount,
    /// Wrapped-token balance of the owner after confirmation.
    pub balance: Amount,
    pub confirmation: TxConfirmation,
}

/// Wrap `amount` native currency into `asset` (WETH) and report the new
/// balance of `owner`.
pub async fn wrap_native<M: Erc20 + NativeWrapper + ?Sized>(
    market: &M,
    asset: &Asset,
    amount: Decimal,
    owner: Address,
) -> Result<WrapOutcome, BorrowError> {
    let amount = Amount::from_decimal(amount, asset.decimals)?;
    if amount.is_zero() {
        return Err(BorrowError::InvalidAmount {
            reason: format!("wrap amount rounds to zero {}", asset.symbol),
        });
    }

    let confirmation = market.wrap(asset.address, amount.raw()).await?;
    let balance = Amount::from_raw(
        market.balance_of(asset.address, owner).await?,
        asset.decimals,
    );

    info!(
        asset = %asset,
        %amount,
        %balance,
        tx = %confirmation.tx_hash,
        "wrapped native currency"
    );
    Ok(WrapOutcome {
        amount,
        balance,
        confirmation,
    })
}
