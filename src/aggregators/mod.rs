pub mod analytics;
pub mod leaderboard;
pub mod snapshot;
pub mod tournaments;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    chains::ChainContext,
    errors::ChainError,
    retry::{retry_with_delay, with_timeout},
};

/// How the wager addresses of a chain are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WagerEnumeration {
    /// Reads `getAllWagersCount()` and fetches every index below it with
    /// retries. An index that still cannot be read is skipped.
    #[default]
    Counted,
    /// Reads `allWagers(i)` from 0 upward without retries and stops at the
    /// first failure.
    Probe,
}

/// Lists the wager addresses of `ctx`'s chain in index order.
pub async fn enumerate_wagers(
    ctx: &ChainContext,
    strategy: WagerEnumeration,
) -> Result<Vec<Address>, ChainError> {
    match strategy {
        WagerEnumeration::Counted => counted(ctx).await,
        WagerEnumeration::Probe => Ok(probe(ctx).await),
    }
}

async fn counted(ctx: &ChainContext) -> Result<Vec<Address>, ChainError> {
    let count = retry_with_delay(&ctx.retry, "getAllWagersCount", || {
        ctx.contracts.wager_count()
    })
    .await?;

    // The count comes from the chain, so it does not size the allocation.
    let mut wagers = Vec::new();
    for index in 0..count {
        match retry_with_delay(&ctx.retry, "allWagers", || ctx.contracts.wager_at(index)).await {
            Ok(wager) => wagers.push(wager),
            Err(e) => warn!(chain_id = ctx.chain_id, index, error = %e, "Skipping wager index"),
        }
    }

    Ok(wagers)
}

async fn probe(ctx: &ChainContext) -> Vec<Address> {
    let mut wagers = Vec::new();
    let mut index = 0u64;

    // Reading past the end reverts, which is how the end is found. A call
    // that times out ends the list the same way.
    while let Ok(wager) = with_timeout(&ctx.retry, ctx.contracts.wager_at(index)).await {
        wagers.push(wager);
        index += 1;
    }
    debug!(chain_id = ctx.chain_id, wagers = wagers.len(), "Probed wager list");

    wagers
}
