//! Sink keyed exactly like the SQL tables, for asserting what was written.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Mutex,
};

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::{
    store::{SnapshotSink, errors::StoreError},
    types::{ChainSummary, PlayerStats, TournamentSnapshot, WagerSnapshot},
};

#[derive(Debug, Default)]
pub struct MemorySink {
    pub wagers: Mutex<BTreeMap<String, WagerSnapshot>>,
    pub summaries: Mutex<BTreeMap<u64, ChainSummary>>,
    pub players: Mutex<BTreeMap<(u64, Address), PlayerStats>>,
    pub tournaments: Mutex<BTreeMap<(u64, u64), TournamentSnapshot>>,
    /// Match addresses whose wager upsert fails.
    failing_wagers: HashSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, match_address: Address) -> Self {
        self.failing_wagers.insert(match_address.to_string());
        self
    }

    pub fn wager(&self, match_address: Address) -> Option<WagerSnapshot> {
        self.wagers
            .lock()
            .unwrap()
            .get(&match_address.to_string())
            .cloned()
    }

    pub fn wager_count(&self) -> usize {
        self.wagers.lock().unwrap().len()
    }

    pub fn summary(&self, chain_id: u64) -> Option<ChainSummary> {
        self.summaries.lock().unwrap().get(&chain_id).copied()
    }

    pub fn player(&self, chain_id: u64, player: Address) -> Option<PlayerStats> {
        self.players.lock().unwrap().get(&(chain_id, player)).copied()
    }

    pub fn tournament_nonces(&self, chain_id: u64) -> Vec<u64> {
        self.tournaments
            .lock()
            .unwrap()
            .keys()
            .filter(|(chain, _)| *chain == chain_id)
            .map(|(_, nonce)| *nonce)
            .collect()
    }
}

#[async_trait]
impl SnapshotSink for MemorySink {
    async fn upsert_wager(&self, wager: &WagerSnapshot) -> Result<(), StoreError> {
        if self.failing_wagers.contains(&wager.match_address) {
            return Err(StoreError::Connection(sqlx::Error::PoolTimedOut));
        }
        self.wagers
            .lock()
            .unwrap()
            .insert(wager.match_address.clone(), wager.clone());
        Ok(())
    }

    async fn upsert_chain_summary(&self, summary: &ChainSummary) -> Result<(), StoreError> {
        self.summaries
            .lock()
            .unwrap()
            .insert(summary.chain_id, *summary);
        Ok(())
    }

    async fn upsert_player_stats(
        &self,
        chain_id: u64,
        player: Address,
        stats: &PlayerStats,
    ) -> Result<(), StoreError> {
        self.players
            .lock()
            .unwrap()
            .insert((chain_id, player), *stats);
        Ok(())
    }

    async fn upsert_tournament(&self, tournament: &TournamentSnapshot) -> Result<(), StoreError> {
        self.tournaments.lock().unwrap().insert(
            (tournament.chain_id, tournament.tournament_nonce),
            tournament.clone(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::mock;

    #[tokio::test]
    async fn test_upserting_same_match_twice_keeps_one_row() {
        let sink = MemorySink::new();
        let address = mock::wager_address(0);
        let params = mock::wager_params(mock::player(1), mock::player(2), 3);

        let first = WagerSnapshot::from_params(1, address, &params, String::new()).unwrap();
        let mut second = first.clone();
        second.fen_string = "8/8/8/8/8/8/8/K6k w - - 0 1".to_string();
        second.is_in_progress = false;

        sink.upsert_wager(&first).await.unwrap();
        sink.upsert_wager(&second).await.unwrap();

        assert_eq!(sink.wager_count(), 1);
        assert_eq!(sink.wager(address), Some(second));
    }

    #[tokio::test]
    async fn test_player_stats_keyed_per_chain() {
        let sink = MemorySink::new();
        let stats = PlayerStats {
            total_games: 3,
            games_won: 2,
        };

        sink.upsert_player_stats(1, mock::player(1), &stats)
            .await
            .unwrap();
        sink.upsert_player_stats(2, mock::player(1), &PlayerStats::default())
            .await
            .unwrap();
        sink.upsert_player_stats(1, mock::player(1), &stats)
            .await
            .unwrap();

        assert_eq!(sink.players.lock().unwrap().len(), 2);
        assert_eq!(sink.player(1, mock::player(1)), Some(stats));
    }
}
