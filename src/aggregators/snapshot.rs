use alloy::primitives::Address;
use tracing::debug;

use crate::{
    chains::ChainContext,
    errors::SnapshotError,
    replay::fen_for_match,
    retry::retry_with_delay,
    store::SnapshotSink,
    types::WagerSnapshot,
};

/// Reads one wager, replays its latest game and writes the result through
/// to `sink` before returning it.
///
/// A replay failure only blanks the FEN. Failing to read or coerce the
/// wager's parameters is reported as [`SnapshotError::Params`].
pub async fn build_wager_snapshot(
    ctx: &ChainContext,
    sink: &dyn SnapshotSink,
    wager: Address,
) -> Result<WagerSnapshot, SnapshotError> {
    let params = retry_with_delay(&ctx.retry, "gameWagers", || {
        ctx.contracts.wager_params(wager)
    })
    .await
    .map_err(|source| SnapshotError::Params { wager, source })?;

    let fen = fen_for_match(ctx, wager).await;

    let snapshot = WagerSnapshot::from_params(ctx.chain_id, wager, &params, fen)
        .map_err(|source| SnapshotError::Params { wager, source })?;

    if let Err(source) = sink.upsert_wager(&snapshot).await {
        return Err(SnapshotError::Persist {
            snapshot: Box::new(snapshot),
            source,
        });
    }
    debug!(chain_id = ctx.chain_id, %wager, "Stored wager snapshot");

    Ok(snapshot)
}
