use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Numeric Constants
// ---------------------------------------------------------------------------

/// Decimals of a WAD-scaled value (1e18): ETH amounts, Aave V2 account data.
pub const WAD_DECIMALS: u8 = 18;

/// Widest scale a `Decimal` can carry.
pub const MAX_DECIMALS: u8 = 28;

// ---------------------------------------------------------------------------
// Aave V2 call parameters
// ---------------------------------------------------------------------------

/// Share of the available borrow capacity actually borrowed. The remaining
/// 5% absorbs price movement between the read and the borrow confirmation.
pub const DEFAULT_SAFETY_MARGIN: Decimal = dec!(0.95);

/// Confirmation depth waited for after every state-changing call.
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

/// Amount of native currency wrapped and deposited, in ETH.
pub const DEFAULT_WRAP_AMOUNT: Decimal = dec!(0.02);

/// Debt (in ETH) still considered "repaid" after the final read.
pub const DEFAULT_DEBT_DUST_THRESHOLD: Decimal = dec!(0.000001);
