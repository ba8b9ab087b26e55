//! In-memory contracts for exercising the aggregators without a node.

use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::{
    chains::{ChainContext, traits::ChessContracts},
    errors::ChainError,
    retry::RetryPolicy,
    types::{TournamentParams, WagerParams, WagerStatus},
};

#[derive(Debug, Clone)]
pub struct FakeWager {
    pub address: Address,
    /// `None` makes `gameWagers` revert.
    pub params: Option<WagerParams>,
    pub status: WagerStatus,
    /// Encoded moves of the most recent game, as indices into the notation table.
    pub moves: Vec<u16>,
    pub game_length: u64,
}

#[derive(Debug, Clone)]
pub struct FakeTournament {
    /// `None` makes `tournaments(nonce)` revert.
    pub params: Option<TournamentParams>,
    pub players: Vec<Address>,
}

#[derive(Debug, Default)]
pub struct FakeChain {
    pub wagers: Vec<FakeWager>,
    pub tournaments: Vec<FakeTournament>,
    notation: Vec<String>,
    calls: Mutex<Vec<String>>,
    /// Calls that never answer. `allWagers` only hangs past the last wager.
    hanging: Vec<&'static str>,
    /// Counts reported instead of the real list lengths.
    reported_wager_count: Option<u64>,
    reported_tournament_count: Option<u64>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a wager between `player0` and `player1` whose latest game is `moves`.
    pub fn with_wager(
        mut self,
        player0: Address,
        player1: Address,
        number_of_games: u64,
        wins: (u64, u64),
        moves: &[&str],
    ) -> Self {
        let index = self.wagers.len();
        let encoded = moves
            .iter()
            .map(|notation| {
                self.notation.push(notation.to_string());
                (self.notation.len() - 1) as u16
            })
            .collect();

        self.wagers.push(FakeWager {
            address: wager_address(index),
            params: Some(wager_params(player0, player1, number_of_games)),
            status: WagerStatus {
                wins_player0: U256::from(wins.0),
                wins_player1: U256::from(wins.1),
            },
            moves: encoded,
            game_length: wins.0 + wins.1,
        });
        self
    }

    pub fn with_broken_params(mut self, index: usize) -> Self {
        self.wagers[index].params = None;
        self
    }

    pub fn with_tournament(mut self, players: Vec<Address>, number_of_games: u64) -> Self {
        self.tournaments.push(FakeTournament {
            params: Some(tournament_params(players.len() as u64, number_of_games)),
            players,
        });
        self
    }

    pub fn with_broken_tournament(mut self, nonce: usize) -> Self {
        self.tournaments[nonce].params = None;
        self
    }

    pub fn with_hanging(mut self, call: &'static str) -> Self {
        self.hanging.push(call);
        self
    }

    pub fn reporting_wager_count(mut self, count: u64) -> Self {
        self.reported_wager_count = Some(count);
        self
    }

    pub fn reporting_tournament_count(mut self, count: u64) -> Self {
        self.reported_tournament_count = Some(count);
        self
    }

    pub fn context(self) -> (ChainContext, Arc<FakeChain>) {
        let chain = Arc::new(self);
        let ctx = ChainContext::new(1337, chain.clone(), test_retry_policy());
        (ctx, chain)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn hang_if_configured(&self, call: &'static str) {
        if self.hanging.contains(&call) {
            std::future::pending::<()>().await;
        }
    }

    fn find(&self, wager: Address) -> Result<&FakeWager, ChainError> {
        self.wagers
            .iter()
            .find(|w| w.address == wager)
            .ok_or_else(|| ChainError::Rpc(format!("unknown wager {wager}")))
    }

    fn find_tournament(&self, nonce: u64) -> Result<&FakeTournament, ChainError> {
        self.tournaments
            .get(nonce as usize)
            .ok_or_else(|| ChainError::Rpc(format!("unknown tournament {nonce}")))
    }
}

#[async_trait]
impl ChessContracts for FakeChain {
    async fn wager_count(&self) -> Result<u64, ChainError> {
        self.record("getAllWagersCount".to_string());
        Ok(self
            .reported_wager_count
            .unwrap_or(self.wagers.len() as u64))
    }

    async fn wager_at(&self, index: u64) -> Result<Address, ChainError> {
        self.record(format!("allWagers({index})"));
        tokio::task::yield_now().await;
        match self.wagers.get(index as usize) {
            Some(w) => Ok(w.address),
            None => {
                self.hang_if_configured("allWagers").await;
                Err(ChainError::Rpc("execution reverted".to_string()))
            }
        }
    }

    async fn wager_params(&self, wager: Address) -> Result<WagerParams, ChainError> {
        self.record(format!("gameWagers({wager})"));
        self.find(wager)?
            .params
            .clone()
            .ok_or_else(|| ChainError::Rpc("could not decode gameWagers".to_string()))
    }

    async fn wager_status(&self, wager: Address) -> Result<WagerStatus, ChainError> {
        self.record(format!("wagerStatus({wager})"));
        Ok(self.find(wager)?.status)
    }

    async fn game_length(&self, wager: Address) -> Result<u64, ChainError> {
        self.record(format!("getGameLength({wager})"));
        self.hang_if_configured("getGameLength").await;
        Ok(self.find(wager)?.game_length)
    }

    async fn game_moves(&self, wager: Address, game: u64) -> Result<Vec<u16>, ChainError> {
        self.record(format!("getGameMoves({wager},{game})"));
        Ok(self.find(wager)?.moves.clone())
    }

    async fn hex_to_move(&self, encoded: u16) -> Result<String, ChainError> {
        self.hang_if_configured("hexToMove").await;
        self.notation
            .get(encoded as usize)
            .cloned()
            .ok_or_else(|| ChainError::Rpc(format!("bad move {encoded:#x}")))
    }

    async fn tournament_count(&self) -> Result<u64, ChainError> {
        self.record("tournamentNonce".to_string());
        Ok(self
            .reported_tournament_count
            .unwrap_or(self.tournaments.len() as u64))
    }

    async fn tournament(&self, nonce: u64) -> Result<TournamentParams, ChainError> {
        self.record(format!("tournaments({nonce})"));
        tokio::task::yield_now().await;
        self.find_tournament(nonce)?
            .params
            .clone()
            .ok_or_else(|| ChainError::Rpc("execution reverted".to_string()))
    }

    async fn tournament_players(&self, nonce: u64) -> Result<Vec<Address>, ChainError> {
        self.record(format!("getTournamentPlayers({nonce})"));
        Ok(self.find_tournament(nonce)?.players.clone())
    }
}

pub fn test_retry_policy() -> RetryPolicy {
    RetryPolicy::new(std::time::Duration::ZERO, Some(1), None)
}

pub fn wager_address(index: usize) -> Address {
    let mut bytes = [0u8; 20];
    bytes[0] = 0xaa;
    bytes[19] = index as u8;
    Address::from(bytes)
}

pub fn player(n: u8) -> Address {
    Address::with_last_byte(n)
}

pub fn wager_params(player0: Address, player1: Address, number_of_games: u64) -> WagerParams {
    WagerParams {
        player0,
        player1,
        wager_token: Address::with_last_byte(0xee),
        wager_amount: U256::from(1_000_000u64),
        number_of_games: U256::from(number_of_games),
        is_in_progress: true,
        time_limit: U256::from(3_600u64),
        time_last_move: U256::from(1_700_000_000u64),
        time_player0: U256::from(1_200u64),
        time_player1: U256::from(1_500u64),
        is_tournament: false,
    }
}

pub fn tournament_params(number_of_players: u64, number_of_games: u64) -> TournamentParams {
    TournamentParams {
        number_of_players: U256::from(number_of_players),
        number_of_games: U256::from(number_of_games),
        token: Address::with_last_byte(0xee),
        token_amount: U256::from(5_000u64),
        is_in_progress: false,
        start_time: U256::from(1_700_000_000u64),
        time_limit: U256::from(86_400u64),
        is_complete: false,
        is_tournament: true,
    }
}
