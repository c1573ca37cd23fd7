use std::path::PathBuf;
use std::process::ExitCode;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use anyhow::{Context, Result};
use tracing::{error, info, warn};

use aave_borrow::config::{self, RunnerConfig};
use aave_borrow::core::borrow_flow::{exit_code, BorrowFlow, BorrowPlan};
use aave_borrow::execution::aave_client::{AaveClient, HttpProvider};
use aave_borrow::logging;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file (ignore if missing).
    let _ = dotenvy::dotenv();

    let config_dir = std::env::var("BORROW_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    // No subscriber exists yet, so failures up to here go to stderr directly.
    let config = match config::load_config(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("aave-borrow: {e:#}");
            return ExitCode::from(1);
        }
    };

    // Hold the guard for the process lifetime.
    let _guard = match logging::init_tracing(&config.app.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("aave-borrow: failed to initialise logging: {e:#}");
            return ExitCode::from(1);
        }
    };

    match run(&config).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!(error = %format!("{e:#}"), "startup failed");
            ExitCode::from(1)
        }
    }
}

async fn run(config: &RunnerConfig) -> Result<u8> {
    for var in &config.env_overrides {
        info!(var = *var, "env override applied");
    }

    info!(
        chain_id = config.chain.chain_id,
        chain_name = %config.chain.chain_name,
        collateral = %config.borrow.collateral_token,
        debt = %config.borrow.debt_token,
        "aave-borrow starting"
    );

    let signer = init_signer()?;
    let account = signer.address();
    let client = AaveClient::new(
        connect(config, signer).await?,
        account,
        config.borrow.confirmations,
    );
    info!(%account, "signer loaded");

    let plan = BorrowPlan::from_config(config, client.account())?;
    check_feed_decimals(&client, &plan).await;

    let result = BorrowFlow::new(&client, &plan).run().await;
    if let Err(aborted) = &result {
        error!(
            stage = %aborted.stage,
            error = %aborted.source,
            "borrow flow aborted"
        );
    }
    Ok(exit_code(&result))
}

/// Load the signing key from `PRIVATE_KEY` (hex, `0x` prefix optional).
fn init_signer() -> Result<PrivateKeySigner> {
    let key = std::env::var("PRIVATE_KEY")
        .ok()
        .filter(|v| !v.is_empty())
        .context("PRIVATE_KEY is required")?;
    let key = key.strip_prefix("0x").unwrap_or(&key);
    key.parse::<PrivateKeySigner>()
        .context("failed to parse PRIVATE_KEY")
}

/// Build the wallet-enabled HTTP provider and compare the node's chain id
/// with the configured one.
async fn connect(config: &RunnerConfig, signer: PrivateKeySigner) -> Result<HttpProvider> {
    let rpc_url: Url = config
        .chain
        .rpc
        .http_url
        .parse()
        .context("failed to parse RPC URL")?;

    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(rpc_url)
        .erased();

    let chain_id = provider
        .get_chain_id()
        .await
        .context("failed to query chain id")?;
    if chain_id != config.chain.chain_id {
        warn!(
            node = chain_id,
            configured = config.chain.chain_id,
            "RPC chain id differs from configuration"
        );
    }
    info!(chain_id, "provider connected");
    Ok(provider)
}

/// Warn when the feed's on-chain decimals disagree with configuration; the
/// configured value is still used.
async fn check_feed_decimals(client: &AaveClient, plan: &BorrowPlan) {
    let feed: Address = plan.price_feed;
    match client.feed_decimals(feed).await {
        Ok(decimals) if decimals != plan.price_decimals => warn!(
            %feed,
            on_chain = decimals,
            configured = plan.price_decimals,
            "price feed decimals differ from configuration"
        ),
        Ok(_) => {}
        Err(e) => warn!(%feed, error = %e, "could not read price feed decimals"),
    }
}
