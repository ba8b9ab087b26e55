use alloy::primitives::Address;
use tracing::{error, info, warn};

use crate::{
    aggregators::{WagerEnumeration, enumerate_wagers, snapshot::build_wager_snapshot},
    chains::ChainContext,
    errors::SnapshotError,
    retry::retry_with_delay,
    store::SnapshotSink,
    types::{ChainSummary, WagerSnapshot, to_i64},
};

/// Snapshots every wager of the chain and stores the chain summary.
///
/// Returns `None` when the run was aborted: the wager list could not be
/// read or a wager's parameters could not be. Snapshots written before the
/// abort stay written and no summary is stored.
pub async fn run(
    ctx: &ChainContext,
    sink: &dyn SnapshotSink,
    strategy: WagerEnumeration,
) -> Option<Vec<WagerSnapshot>> {
    let wagers = match enumerate_wagers(ctx, strategy).await {
        Ok(wagers) => wagers,
        Err(e) => {
            error!(chain_id = ctx.chain_id, error = %e, "Failed to list wagers");
            return None;
        }
    };
    info!(chain_id = ctx.chain_id, wagers = wagers.len(), "Building wager snapshots");

    let mut built: Vec<(Address, WagerSnapshot)> = Vec::with_capacity(wagers.len());
    for wager in wagers {
        match build_wager_snapshot(ctx, sink, wager).await {
            Ok(snapshot) => built.push((wager, snapshot)),
            Err(SnapshotError::Persist { snapshot, source }) => {
                warn!(chain_id = ctx.chain_id, %wager, error = %source, "Failed to store wager snapshot");
                built.push((wager, *snapshot));
            }
            Err(e) => {
                error!(chain_id = ctx.chain_id, %wager, error = %e, "Aborting analytics");
                return None;
            }
        }
    }

    let summary = ChainSummary {
        chain_id: ctx.chain_id,
        number_of_games: count_games(ctx, &built).await,
        number_of_wagers: built.len() as i64,
    };
    if let Err(e) = sink.upsert_chain_summary(&summary).await {
        warn!(chain_id = ctx.chain_id, error = %e, "Failed to store chain summary");
    }

    Some(built.into_iter().map(|(_, snapshot)| snapshot).collect())
}

async fn count_games(ctx: &ChainContext, built: &[(Address, WagerSnapshot)]) -> i64 {
    let mut games: i64 = 0;

    for (wager, _) in built {
        let wager = *wager;
        let played = retry_with_delay(&ctx.retry, "wagerStatus", || {
            ctx.contracts.wager_status(wager)
        })
        .await
        .and_then(|status| to_i64(status.games_played(), "gamesPlayed"));

        match played {
            Ok(played) => games = games.saturating_add(played),
            Err(e) => warn!(chain_id = ctx.chain_id, %wager, error = %e, "Failed to read wager status"),
        }
    }

    games
}
