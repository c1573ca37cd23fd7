pub mod types;
pub mod validate;

pub use types::*;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

/// Load and merge all config JSON files into a single [`RunnerConfig`],
/// then apply environment variable overrides and validate.
///
/// Expected directory layout:
/// ```text
/// config/
///   app.json
///   chains/1.json
///   borrow.json
/// ```
///
/// # Environment variable overrides
///
/// | Env Var               | Config Field                  |
/// |-----------------------|-------------------------------|
/// | `ETH_RPC_URL`         | `chain.rpc.http_url`          |
/// | `WRAP_AMOUNT`         | `borrow.wrap_amount`          |
/// | `INTEREST_RATE_MODE`  | `borrow.interest_rate_mode`   |
/// | `CONFIRMATIONS`       | `borrow.confirmations`        |
///
/// The signing key is never read from JSON; see `PRIVATE_KEY` in `main.rs`.
pub fn load_config(config_dir: &Path) -> Result<RunnerConfig> {
    let read = |name: &str| -> Result<String> {
        let path = config_dir.join(name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))
    };

    let app: AppConfig = serde_json::from_str(&read("app.json")?).context("parsing app.json")?;

    let chain: ChainConfig =
        serde_json::from_str(&read("chains/1.json")?).context("parsing chains/1.json")?;

    let borrow: BorrowConfig =
        serde_json::from_str(&read("borrow.json")?).context("parsing borrow.json")?;

    let mut config = RunnerConfig {
        app,
        chain,
        borrow,
        env_overrides: Vec::new(),
    };

    config.env_overrides = apply_env_overrides(&mut config);
    validate::validate_config(&config)?;

    Ok(config)
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Only non-empty env vars take effect. Parse failures are skipped (the JSON
/// value remains). Returns the names of the variables that were applied;
/// loading runs before tracing is installed, so the caller logs them.
fn apply_env_overrides(config: &mut RunnerConfig) -> Vec<&'static str> {
    let mut applied = Vec::new();

    if let Some(val) = env_string("ETH_RPC_URL") {
        config.chain.rpc.http_url = val;
        applied.push("ETH_RPC_URL");
    }

    if let Some(val) = env_decimal("WRAP_AMOUNT") {
        config.borrow.wrap_amount = val;
        applied.push("WRAP_AMOUNT");
    }

    if let Some(val) = env_parse::<InterestRateMode>("INTEREST_RATE_MODE") {
        config.borrow.interest_rate_mode = val;
        applied.push("INTEREST_RATE_MODE");
    }

    if let Some(val) = env_parse::<u64>("CONFIRMATIONS") {
        config.borrow.confirmations = val;
        applied.push("CONFIRMATIONS");
    }

    applied
}

/// Read a non-empty env var as a `String`.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read a non-empty env var and parse it as `T`.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}

/// Read a non-empty env var and parse it as `Decimal`.
fn env_decimal(key: &str) -> Option<Decimal> {
    env_string(key).and_then(|v| Decimal::from_str(&v).ok())
}
