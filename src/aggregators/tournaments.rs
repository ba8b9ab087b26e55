use tracing::{info, warn};

use crate::{
    chains::ChainContext,
    errors::ChainError,
    retry::retry_with_delay,
    store::SnapshotSink,
    types::TournamentSnapshot,
};

/// Snapshots every tournament with a nonce below `tournamentNonce()`.
///
/// Errors only when the nonce itself cannot be read. A tournament that
/// fails to load or store is logged and the loop moves on.
pub async fn run(
    ctx: &ChainContext,
    sink: &dyn SnapshotSink,
) -> Result<Vec<TournamentSnapshot>, ChainError> {
    let count = retry_with_delay(&ctx.retry, "tournamentNonce", || {
        ctx.contracts.tournament_count()
    })
    .await?;
    info!(chain_id = ctx.chain_id, tournaments = count, "Building tournament snapshots");

    let mut snapshots = Vec::new();
    for nonce in 0..count {
        let snapshot = match load(ctx, nonce).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(chain_id = ctx.chain_id, nonce, error = %e, "Failed to read tournament");
                continue;
            }
        };

        if let Err(e) = sink.upsert_tournament(&snapshot).await {
            warn!(chain_id = ctx.chain_id, nonce, error = %e, "Failed to store tournament");
        }
        snapshots.push(snapshot);
    }

    Ok(snapshots)
}

async fn load(ctx: &ChainContext, nonce: u64) -> Result<TournamentSnapshot, ChainError> {
    let params = retry_with_delay(&ctx.retry, "tournaments", || {
        ctx.contracts.tournament(nonce)
    })
    .await?;
    let players = retry_with_delay(&ctx.retry, "getTournamentPlayers", || {
        ctx.contracts.tournament_players(nonce)
    })
    .await?;

    TournamentSnapshot::from_params(ctx.chain_id, nonce, &params, &players)
}
