//! Compile-time ABI definitions for on-chain contracts via Alloy `sol!`.
//!
//! Each interface exposes only the functions the borrow flow calls.

use alloy::sol;

// ---------------------------------------------------------------------------
// Aave V2 LendingPoolAddressesProvider
// ---------------------------------------------------------------------------

sol! {
    /// Registry that points at the currently active LendingPool.
    #[sol(rpc)]
    interface ILendingPoolAddressesProvider {
        function getLendingPool() external view returns (address);
    }
}

// ---------------------------------------------------------------------------
// Aave V2 LendingPool
// ---------------------------------------------------------------------------

sol! {
    /// Aave V2 LendingPool. Account data is denominated in ETH (18 decimals).
    #[sol(rpc)]
    interface ILendingPool {
        /// Deposit `amount` of `asset` as collateral for `onBehalfOf`.
        function deposit(
            address asset,
            uint256 amount,
            address onBehalfOf,
            uint16 referralCode
        ) external;

        /// Borrow `amount` of `asset`; `interestRateMode` 1 = stable, 2 = variable.
        function borrow(
            address asset,
            uint256 amount,
            uint256 interestRateMode,
            uint16 referralCode,
            address onBehalfOf
        ) external;

        /// Repay borrowed asset.
        function repay(
            address asset,
            uint256 amount,
            uint256 rateMode,
            address onBehalfOf
        ) external returns (uint256);

        /// Get aggregated user position data.
        function getUserAccountData(address user) external view returns (
            uint256 totalCollateralETH,
            uint256 totalDebtETH,
            uint256 availableBorrowsETH,
            uint256 currentLiquidationThreshold,
            uint256 ltv,
            uint256 healthFactor
        );
    }
}

// ---------------------------------------------------------------------------
// ERC-20 / WETH
// ---------------------------------------------------------------------------

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address owner) external view returns (uint256);
    }
}

sol! {
    /// Wrapped ether: `deposit` mints WETH 1:1 for the attached value.
    #[sol(rpc)]
    interface IWETH {
        function deposit() external payable;
    }
}

// ---------------------------------------------------------------------------
// Chainlink Aggregator V3
// ---------------------------------------------------------------------------

sol! {
    #[sol(rpc)]
    interface IAggregatorV3 {
        function latestRoundData() external view returns (
            uint80 roundId,
            int256 answer,
            uint256 startedAt,
            uint256 updatedAt,
            uint80 answeredInRound
        );

        function decimals() external view returns (uint8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, U256};
    use alloy::sol_types::SolCall;

    const WETH: alloy::primitives::Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
    const USER: alloy::primitives::Address = address!("0000000000000000000000000000000000000001");

    #[test]
    fn test_deposit_selector() {
        let data = ILendingPool::depositCall {
            asset: WETH,
            amount: U256::from(1u64),
            onBehalfOf: USER,
            referralCode: 0,
        }
        .abi_encode();
        // deposit(address,uint256,address,uint16) = 0xe8eda9df
        assert_eq!(&data[..4], &[0xe8, 0xed, 0xa9, 0xdf]);
    }

    #[test]
    fn test_borrow_selector() {
        let data = ILendingPool::borrowCall {
            asset: WETH,
            amount: U256::from(1u64),
            interestRateMode: U256::from(1u64),
            referralCode: 0,
            onBehalfOf: USER,
        }
        .abi_encode();
        // borrow(address,uint256,uint256,uint16,address) = 0xa415bcad
        assert_eq!(&data[..4], &[0xa4, 0x15, 0xbc, 0xad]);
    }

    #[test]
    fn test_repay_selector() {
        let data = ILendingPool::repayCall {
            asset: WETH,
            amount: U256::from(1u64),
            rateMode: U256::from(1u64),
            onBehalfOf: USER,
        }
        .abi_encode();
        // repay(address,uint256,uint256,address) = 0x573ade81
        assert_eq!(&data[..4], &[0x57, 0x3a, 0xde, 0x81]);
    }

    #[test]
    fn test_approve_selector() {
        let data = IERC20::approveCall {
            spender: USER,
            amount: U256::from(1u64),
        }
        .abi_encode();
        // approve(address,uint256) = 0x095ea7b3
        assert_eq!(&data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
    }

    #[test]
    fn test_borrow_roundtrip() {
        let amount = U256::from(19_000_000_000_000_000_000_000u128);
        let data = ILendingPool::borrowCall {
            asset: WETH,
            amount,
            interestRateMode: U256::from(2u64),
            referralCode: 0,
            onBehalfOf: USER,
        }
        .abi_encode();

        let decoded = ILendingPool::borrowCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.asset, WETH);
        assert_eq!(decoded.amount, amount);
        assert_eq!(decoded.interestRateMode, U256::from(2u64));
        assert_eq!(decoded.onBehalfOf, USER);
    }
}
