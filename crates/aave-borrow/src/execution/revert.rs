//! Human-readable revert reasons for failed contract calls.
//!
//! Aave V2 reverts with `Error(string)` whose payload is a bare numeric
//! code (`"11"`); those codes are expanded to their `Errors.sol` names.

use alloy::sol_types::{Panic, Revert, SolError};

/// `Errors.sol` names for the validation codes the borrow flow can hit.
fn aave_v2_error_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "1" => "VL_INVALID_AMOUNT",
        "2" => "VL_NO_ACTIVE_RESERVE",
        "3" => "VL_RESERVE_FROZEN",
        "4" => "VL_CURRENT_AVAILABLE_LIQUIDITY_NOT_ENOUGH",
        "5" => "VL_NOT_ENOUGH_AVAILABLE_USER_BALANCE",
        "6" => "VL_TRANSFER_NOT_ALLOWED",
        "7" => "VL_BORROWING_NOT_ENABLED",
        "8" => "VL_INVALID_INTEREST_RATE_MODE_SELECTED",
        "9" => "VL_COLLATERAL_BALANCE_IS_0",
        "10" => "VL_HEALTH_FACTOR_LOWER_THAN_LIQUIDATION_THRESHOLD",
        "11" => "VL_COLLATERAL_CANNOT_COVER_NEW_BORROW",
        "12" => "VL_STABLE_BORROWING_NOT_ENABLED",
        "13" => "VL_COLLATERAL_SAME_AS_BORROWING_CURRENCY",
        "14" => "VL_AMOUNT_BIGGER_THAN_MAX_LOAN_SIZE_STABLE",
        "15" => "VL_NO_DEBT_OF_SELECTED_TYPE",
        "16" => "VL_NO_EXPLICIT_AMOUNT_TO_REPAY_ON_BEHALF",
        "17" => "VL_NO_STABLE_RATE_LOAN_IN_RESERVE",
        "18" => "VL_NO_VARIABLE_RATE_LOAN_IN_RESERVE",
        "19" => "VL_UNDERLYING_BALANCE_NOT_GREATER_THAN_0",
        "20" => "VL_DEPOSIT_ALREADY_IN_USE",
        "64" => "LP_IS_PAUSED",
        _ => return None,
    };
    Some(name)
}

/// Decode a revert reason from raw return data.
///
/// `Error(string)` payloads are returned as text, with Aave V2 codes
/// expanded (`"11 (VL_COLLATERAL_CANNOT_COVER_NEW_BORROW)"`). `Panic`
/// payloads are described by kind. Anything else is hex-encoded.
pub fn decode_revert_reason(data: &[u8]) -> String {
    if data.is_empty() {
        return "Unknown revert".into();
    }

    if let Ok(revert) = Revert::abi_decode(data) {
        return match aave_v2_error_name(&revert.reason) {
            Some(name) => format!("{} ({name})", revert.reason),
            None => revert.reason,
        };
    }

    if let Ok(panic) = Panic::abi_decode(data) {
        return panic.to_string();
    }

    hex::encode(data)
}

/// Describe a failed contract call, decoding the node's revert payload when
/// one is attached.
pub fn describe_contract_error(err: &alloy::contract::Error) -> String {
    if let alloy::contract::Error::TransportError(transport) = err {
        if let Some(payload) = transport.as_error_resp() {
            if let Some(data) = payload.as_revert_data() {
                return format!("{} ({})", payload.message, decode_revert_reason(&data));
            }
        }
    }
    err.to_string()
}
