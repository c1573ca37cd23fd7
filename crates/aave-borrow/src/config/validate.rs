use anyhow::{bail, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::types::RunnerConfig;
use crate::constants::MAX_DECIMALS;

/// Validate invariants across the merged config that serde alone cannot enforce.
///
/// Collects every problem before failing so one run reports them all.
/// Called automatically by [`super::load_config`].
pub fn validate_config(config: &RunnerConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    validate_logging_config(config, &mut errors);
    validate_chain_config(config, &mut errors);
    validate_borrow_config(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        let msg = format!(
            "Configuration validation failed ({} error{}):\n  - {}",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" },
            errors.join("\n  - ")
        );
        bail!("{msg}");
    }
}

// ---------------------------------------------------------------------------
// App config
// ---------------------------------------------------------------------------

fn validate_logging_config(config: &RunnerConfig, errors: &mut Vec<String>) {
    if config.app.logging.log_dir.is_empty() {
        errors.push("app.logging: log_dir is empty".into());
    }
}

// ---------------------------------------------------------------------------
// Chain config
// ---------------------------------------------------------------------------

fn validate_chain_config(config: &RunnerConfig, errors: &mut Vec<String>) {
    let chain = &config.chain;

    if chain.rpc.http_url.is_empty() {
        errors.push("chain.rpc: http_url is empty".into());
    }

    if let Err(e) = validate_address(&chain.contracts.lending_pool_addresses_provider) {
        errors.push(format!("chain.contracts.lending_pool_addresses_provider: {e}"));
    }

    if chain.tokens.is_empty() {
        errors.push("chain.tokens: must have at least one token".into());
    }

    for (name, token) in &chain.tokens {
        if let Err(e) = validate_address(&token.address) {
            errors.push(format!("chain.tokens.{name}.address: {e}"));
        }
        if token.decimals > MAX_DECIMALS {
            errors.push(format!(
                "chain.tokens.{name}.decimals ({}) exceeds {MAX_DECIMALS}",
                token.decimals
            ));
        }
    }

    for (name, feed) in &chain.price_feeds {
        if let Err(e) = validate_address(&feed.address) {
            errors.push(format!("chain.price_feeds.{name}.address: {e}"));
        }
        if feed.decimals > MAX_DECIMALS {
            errors.push(format!(
                "chain.price_feeds.{name}.decimals ({}) exceeds {MAX_DECIMALS}",
                feed.decimals
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Borrow config
// ---------------------------------------------------------------------------

fn validate_borrow_config(config: &RunnerConfig, errors: &mut Vec<String>) {
    let borrow = &config.borrow;
    let chain = &config.chain;

    // Token and feed keys must resolve.
    for (field, key) in [
        ("collateral_token", &borrow.collateral_token),
        ("debt_token", &borrow.debt_token),
    ] {
        if !chain.tokens.contains_key(key) {
            errors.push(format!("borrow.{field}: '{key}' is not in chain.tokens"));
        }
    }
    if borrow.collateral_token == borrow.debt_token {
        errors.push(format!(
            "borrow: collateral_token and debt_token are both '{}'",
            borrow.collateral_token
        ));
    }
    if !chain.price_feeds.contains_key(&borrow.price_feed) {
        errors.push(format!(
            "borrow.price_feed: '{}' is not in chain.price_feeds",
            borrow.price_feed
        ));
    }

    if borrow.wrap_amount <= Decimal::ZERO {
        errors.push(format!(
            "borrow: wrap_amount ({}) must be > 0",
            borrow.wrap_amount
        ));
    }

    // Margin must leave headroom and still borrow something.
    if borrow.safety_margin <= Decimal::ZERO || borrow.safety_margin >= dec!(1) {
        errors.push(format!(
            "borrow: safety_margin ({}) must be in (0, 1)",
            borrow.safety_margin
        ));
    }

    if borrow.confirmations == 0 {
        errors.push("borrow: confirmations must be >= 1".into());
    }

    if borrow.debt_dust_threshold < Decimal::ZERO {
        errors.push(format!(
            "borrow: debt_dust_threshold ({}) must be >= 0",
            borrow.debt_dust_threshold
        ));
    }

    if borrow.max_price_age_seconds == Some(0) {
        errors.push("borrow: max_price_age_seconds must be > 0 when set".into());
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate an Ethereum-style address string: must be 0x-prefixed and 42 chars
/// of hex.
fn validate_address(addr: &str) -> Result<(), String> {
    if addr.is_empty() {
        return Err("address is empty".into());
    }
    if !addr.starts_with("0x") && !addr.starts_with("0X") {
        return Err(format!("address '{addr}' must start with 0x"));
    }
    if addr.len() != 42 {
        return Err(format!(
            "address '{addr}' has length {} (expected 42)",
            addr.len()
        ));
    }
    if !addr[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("address '{addr}' contains non-hex characters"));
    }
    Ok(())
}
