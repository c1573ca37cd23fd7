use alloy::primitives::Address;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use crate::errors::BorrowError;
use crate::execution::market::PriceFeed;
use crate::types::{Amount, PriceSample, RoundData};

/// Read the latest answer from a Chainlink-style feed.
///
/// The answer is scaled by the feed's `decimals`. Non-positive answers are
/// rejected. With `max_age_seconds` set, a round older than that fails with
/// [`BorrowError::OracleStale`]; without it the latest round is trusted.
pub async fn get_price<F: PriceFeed + ?Sized>(
    feeds: &F,
    feed: Address,
    decimals: u8,
    max_age_seconds: Option<u64>,
) -> Result<PriceSample, BorrowError> {
    let round = feeds.latest_round_data(feed).await?;

    if !round.answer.is_positive() {
        return Err(BorrowError::InvalidPrice {
            answer: round.answer.to_string(),
        });
    }

    if round.answered_in_round < round.round_id {
        warn!(
            %feed,
            round_id = round.round_id,
            answered_in_round = round.answered_in_round,
            "price answer carried over from an earlier round"
        );
    }

    check_freshness(&round, max_age_seconds, unix_now())?;

    let price = Amount::from_raw(round.answer.into_raw(), decimals).to_decimal()?;
    info!(%feed, %price, round_id = round.round_id, updated_at = round.updated_at, "price read");

    Ok(PriceSample {
        price,
        round_id: round.round_id,
        updated_at: round.updated_at,
    })
}

/// Fail when `round` is older than `max_age_seconds` at `now`.
pub fn check_freshness(
    round: &RoundData,
    max_age_seconds: Option<u64>,
    now: u64,
) -> Result<(), BorrowError> {
    let Some(max_seconds) = max_age_seconds else {
        return Ok(());
    };
    let age_seconds = now.saturating_sub(round.updated_at);
    if age_seconds > max_seconds {
        return Err(BorrowError::OracleStale {
            age_seconds,
            max_seconds,
        });
    }
    Ok(())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
