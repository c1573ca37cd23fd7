use thiserror::Error;

/// Typed error hierarchy for the borrow flow.
///
/// Library-internal errors use specific variants; application code wraps with
/// `anyhow::Context` for propagation. Every variant is fatal to the run.
#[derive(Error, Debug)]
pub enum BorrowError {
    // -- Resolution ---------------------------------------------------------
    #[error("lending pool resolution failed: {reason}")]
    Resolution { reason: String },

    // -- Execution ----------------------------------------------------------
    #[error("approval of {token} for {spender} failed: {reason}")]
    ApprovalFailed {
        token: String,
        spender: String,
        reason: String,
    },

    #[error("{action} reverted: {reason}")]
    TxReverted { action: String, reason: String },

    // -- Reads --------------------------------------------------------------
    #[error("{call} read failed: {reason}")]
    ReadFailed { call: String, reason: String },

    // -- Oracle -------------------------------------------------------------
    #[error("oracle returned non-positive price: {answer}")]
    InvalidPrice { answer: String },

    #[error("oracle stale: {age_seconds}s old (max {max_seconds}s)")]
    OracleStale { age_seconds: u64, max_seconds: u64 },

    // -- Amounts ------------------------------------------------------------
    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("amount {value} does not fit a {decimals}-decimal Decimal")]
    AmountOverflow { value: String, decimals: u8 },

    #[error("computed borrow amount is zero (capacity {capacity}, price {price})")]
    NothingToBorrow { capacity: String, price: String },

    // -- Configuration ------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),
}
