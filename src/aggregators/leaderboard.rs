use std::collections::BTreeMap;

use alloy::primitives::Address;
use tracing::{info, warn};

use crate::{
    aggregators::{WagerEnumeration, enumerate_wagers},
    chains::ChainContext,
    errors::ChainError,
    retry::retry_with_delay,
    store::SnapshotSink,
    types::{PlayerStats, WagerParams, WagerStatus, to_i64},
};

/// Recomputes every player's totals from scratch and upserts them.
///
/// A wager whose reads fail is skipped; the rest of the board is still
/// built and stored.
pub async fn run(
    ctx: &ChainContext,
    sink: &dyn SnapshotSink,
    strategy: WagerEnumeration,
) -> BTreeMap<Address, PlayerStats> {
    let wagers = match enumerate_wagers(ctx, strategy).await {
        Ok(wagers) => wagers,
        Err(e) => {
            warn!(chain_id = ctx.chain_id, error = %e, "Failed to list wagers for leaderboard");
            Vec::new()
        }
    };

    let mut board = BTreeMap::new();
    for wager in wagers {
        let result = async {
            let params = retry_with_delay(&ctx.retry, "gameWagers", || {
                ctx.contracts.wager_params(wager)
            })
            .await?;
            let status = retry_with_delay(&ctx.retry, "wagerStatus", || {
                ctx.contracts.wager_status(wager)
            })
            .await?;
            accumulate(&mut board, &params, &status)
        }
        .await;

        if let Err(e) = result {
            warn!(chain_id = ctx.chain_id, %wager, error = %e, "Skipping wager in leaderboard");
        }
    }

    for (player, stats) in &board {
        if let Err(e) = sink.upsert_player_stats(ctx.chain_id, *player, stats).await {
            warn!(chain_id = ctx.chain_id, %player, error = %e, "Failed to store player stats");
        }
    }
    info!(chain_id = ctx.chain_id, players = board.len(), "Leaderboard updated");

    board
}

/// Adds one wager to the board. The zero address marks an empty slot and is
/// never credited.
pub fn accumulate(
    board: &mut BTreeMap<Address, PlayerStats>,
    params: &WagerParams,
    status: &WagerStatus,
) -> Result<(), ChainError> {
    let games = to_i64(params.number_of_games, "numberOfGames")?;
    let wins = [
        to_i64(status.wins(0), "winsPlayer0")?,
        to_i64(status.wins(1), "winsPlayer1")?,
    ];

    for (slot, player) in params.players().into_iter().enumerate() {
        if player.is_zero() {
            continue;
        }
        let stats = board.entry(player).or_default();
        stats.total_games = stats.total_games.saturating_add(games);
        stats.games_won = stats.games_won.saturating_add(wins[slot]);
    }

    Ok(())
}
