use std::str::FromStr;

use alloy::primitives::{Address, U256};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::errors::ChainError;

/// Raw `gameWagers` tuple as returned by the ChessWager contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WagerParams {
    pub player0: Address,
    pub player1: Address,
    pub wager_token: Address,
    pub wager_amount: U256,
    pub number_of_games: U256,
    pub is_in_progress: bool,
    pub time_limit: U256,
    pub time_last_move: U256,
    pub time_player0: U256,
    pub time_player1: U256,
    pub is_tournament: bool,
}

impl WagerParams {
    /// Both player slots in slot order.
    pub fn players(&self) -> [Address; 2] {
        [self.player0, self.player1]
    }
}

/// Win counters of a wager, indexed by player slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WagerStatus {
    pub wins_player0: U256,
    pub wins_player1: U256,
}

impl WagerStatus {
    pub fn wins(&self, slot: usize) -> U256 {
        if slot == 0 {
            self.wins_player0
        } else {
            self.wins_player1
        }
    }

    pub fn games_played(&self) -> U256 {
        self.wins_player0.saturating_add(self.wins_player1)
    }
}

/// Raw `tournaments(nonce)` tuple from the ChessFishTournament contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentParams {
    pub number_of_players: U256,
    pub number_of_games: U256,
    pub token: Address,
    pub token_amount: U256,
    pub is_in_progress: bool,
    pub start_time: U256,
    pub time_limit: U256,
    pub is_complete: bool,
    pub is_tournament: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WagerSnapshot {
    pub chain_id: u64,
    pub match_address: String,
    pub player0_address: String,
    pub player1_address: String,
    pub wager_token: String,
    pub wager_amount: BigDecimal,
    pub number_of_games: i64,
    pub is_in_progress: bool,
    pub time_limit: i64,
    pub time_last_move: i64,
    pub time_player0: i64,
    pub time_player1: i64,
    pub is_player_turn: bool,
    pub is_tournament: bool,
    pub fen_string: String,
}

impl WagerSnapshot {
    pub fn from_params(
        chain_id: u64,
        match_address: Address,
        params: &WagerParams,
        fen_string: String,
    ) -> Result<Self, ChainError> {
        Ok(Self {
            chain_id,
            match_address: match_address.to_string(),
            player0_address: params.player0.to_string(),
            player1_address: params.player1.to_string(),
            wager_token: params.wager_token.to_string(),
            wager_amount: to_decimal(params.wager_amount, "wager")?,
            number_of_games: to_i64(params.number_of_games, "numberOfGames")?,
            is_in_progress: params.is_in_progress,
            time_limit: to_i64(params.time_limit, "timeLimit")?,
            time_last_move: to_i64(params.time_last_move, "timeLastMove")?,
            time_player0: to_i64(params.time_player0, "timePlayer0")?,
            time_player1: to_i64(params.time_player1, "timePlayer1")?,
            // Turn depends on who is asking; the indexer has no caller.
            is_player_turn: false,
            is_tournament: params.is_tournament,
            fen_string,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSummary {
    pub chain_id: u64,
    pub number_of_games: i64,
    pub number_of_wagers: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub total_games: i64,
    pub games_won: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSnapshot {
    pub chain_id: u64,
    pub tournament_nonce: u64,
    pub number_of_players: i64,
    pub players: Vec<String>,
    pub number_of_games: i64,
    pub token: String,
    pub token_amount: BigDecimal,
    pub is_in_progress: bool,
    pub start_time: i64,
    pub time_limit: i64,
    pub is_complete: bool,
    pub is_tournament: bool,
}

impl TournamentSnapshot {
    pub fn from_params(
        chain_id: u64,
        tournament_nonce: u64,
        params: &TournamentParams,
        players: &[Address],
    ) -> Result<Self, ChainError> {
        Ok(Self {
            chain_id,
            tournament_nonce,
            number_of_players: to_i64(params.number_of_players, "numberOfPlayers")?,
            players: players.iter().map(Address::to_string).collect(),
            number_of_games: to_i64(params.number_of_games, "numberOfGames")?,
            token: params.token.to_string(),
            token_amount: to_decimal(params.token_amount, "tokenAmount")?,
            is_in_progress: params.is_in_progress,
            start_time: to_i64(params.start_time, "startTime")?,
            time_limit: to_i64(params.time_limit, "timeLimit")?,
            is_complete: params.is_complete,
            is_tournament: params.is_tournament,
        })
    }
}

pub fn to_i64(value: U256, field: &'static str) -> Result<i64, ChainError> {
    i64::try_from(value).map_err(|_| ChainError::Conversion {
        field,
        value: value.to_string(),
    })
}

pub fn to_u64(value: U256, field: &'static str) -> Result<u64, ChainError> {
    u64::try_from(value).map_err(|_| ChainError::Conversion {
        field,
        value: value.to_string(),
    })
}

/// Token amounts routinely exceed `i64`, so they are stored as NUMERIC.
pub fn to_decimal(value: U256, field: &'static str) -> Result<BigDecimal, ChainError> {
    BigDecimal::from_str(&value.to_string()).map_err(|_| ChainError::Conversion {
        field,
        value: value.to_string(),
    })
}
