use alloy::primitives::{Address, U256};
use tracing::{debug, info};

use crate::errors::BorrowError;
use crate::execution::market::{Erc20, TxConfirmation};

/// Grant `spender` an allowance of exactly `amount` on `token` and wait for
/// confirmation.
///
/// A zero amount is rejected before anything is sent. Any failure of the
/// approval transaction surfaces as [`BorrowError::ApprovalFailed`].
pub async fn approve_erc20<T: Erc20 + ?Sized>(
    tokens: &T,
    token: Address,
    spender: Address,
    amount: U256,
) -> Result<TxConfirmation, BorrowError> {
    if amount.is_zero() {
        return Err(BorrowError::InvalidAmount {
            reason: format!("refusing zero approval of {token} for {spender}"),
        });
    }

    debug!(%token, %spender, %amount, "sending approval");

    let confirmation = tokens
        .approve(token, spender, amount)
        .await
        .map_err(|e| match e {
            BorrowError::ApprovalFailed { .. } => e,
            other => BorrowError::ApprovalFailed {
                token: token.to_string(),
                spender: spender.to_string(),
                reason: other.to_string(),
            },
        })?;

    info!(
        %token,
        %spender,
        %amount,
        tx = %confirmation.tx_hash,
        "approved"
    );
    Ok(confirmation)
}
