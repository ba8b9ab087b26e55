use alloy::primitives::Address;
use async_trait::async_trait;

use crate::{
    errors::ChainError,
    types::{TournamentParams, WagerParams, WagerStatus},
};

/// Read access to the ChessWager and ChessFishTournament contracts of one
/// chain.
#[async_trait]
pub trait ChessContracts: Send + Sync {
    async fn wager_count(&self) -> Result<u64, ChainError>;
    async fn wager_at(&self, index: u64) -> Result<Address, ChainError>;
    async fn wager_params(&self, wager: Address) -> Result<WagerParams, ChainError>;
    async fn wager_status(&self, wager: Address) -> Result<WagerStatus, ChainError>;
    async fn game_length(&self, wager: Address) -> Result<u64, ChainError>;
    async fn game_moves(&self, wager: Address, game: u64) -> Result<Vec<u16>, ChainError>;
    /// Decodes one packed on-chain move into algebraic notation.
    async fn hex_to_move(&self, encoded: u16) -> Result<String, ChainError>;

    async fn tournament_count(&self) -> Result<u64, ChainError>;
    async fn tournament(&self, nonce: u64) -> Result<TournamentParams, ChainError>;
    async fn tournament_players(&self, nonce: u64) -> Result<Vec<Address>, ChainError>;
}
