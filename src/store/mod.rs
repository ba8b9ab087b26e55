pub mod errors;
pub mod provider;

#[cfg(test)]
pub(crate) mod memory;

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::{
    store::errors::StoreError,
    types::{ChainSummary, PlayerStats, TournamentSnapshot, WagerSnapshot},
};

/// Destination of every snapshot the indexer produces.
///
/// Each write is an upsert on the entity's natural key: inserting when the key
/// is new and overwriting every other column otherwise.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn upsert_wager(&self, wager: &WagerSnapshot) -> Result<(), StoreError>;
    async fn upsert_chain_summary(&self, summary: &ChainSummary) -> Result<(), StoreError>;
    async fn upsert_player_stats(
        &self,
        chain_id: u64,
        player: Address,
        stats: &PlayerStats,
    ) -> Result<(), StoreError>;
    async fn upsert_tournament(&self, tournament: &TournamentSnapshot) -> Result<(), StoreError>;
}
