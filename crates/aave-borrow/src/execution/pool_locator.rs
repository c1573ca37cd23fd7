use alloy::primitives::Address;
use tracing::info;

use crate::errors::BorrowError;
use crate::execution::market::PoolLocator;

/// Resolve the active lending pool through the addresses provider.
///
/// The pool address can change across protocol upgrades, so it is read
/// fresh on every run. A zero address or a failed read is a
/// [`BorrowError::Resolution`].
pub async fn get_lending_pool<L: PoolLocator + ?Sized>(
    locator: &L,
    addresses_provider: Address,
) -> Result<L::Pool, BorrowError> {
    let pool = locator
        .lending_pool_address(addresses_provider)
        .await
        .map_err(|e| BorrowError::Resolution {
            reason: format!("getLendingPool on {addresses_provider}: {e}"),
        })?;

    if pool.is_zero() {
        return Err(BorrowError::Resolution {
            reason: format!("{addresses_provider} returned the zero address"),
        });
    }

    info!(%addresses_provider, %pool, "lending pool resolved");
    Ok(locator.bind_pool(pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::market::LendingPool;
    use crate::execution::mock::{Faults, MockMarket, ADDRESSES_PROVIDER, POOL};

    #[tokio::test]
    async fn test_resolves_pool_address() {
        let market = MockMarket::new();
        let pool = get_lending_pool(&market, ADDRESSES_PROVIDER).await.unwrap();
        assert_eq!(pool.address(), POOL);
    }

    #[tokio::test]
    async fn test_zero_address_is_resolution_error() {
        let market = MockMarket::new().with_faults(Faults {
            resolve_zero_address: true,
            ..Faults::default()
        });
        let err = get_lending_pool(&market, ADDRESSES_PROVIDER)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, BorrowError::Resolution { .. }));
    }
}
