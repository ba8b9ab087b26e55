use alloy::{
    primitives::{Address, U256},
    providers::{Provider, RootProvider},
    transports::http::reqwest::Url,
};
use async_trait::async_trait;
use tracing::info;

use crate::{
    chains::{
        contracts::{
            ChessFishTournament::{self, ChessFishTournamentInstance},
            ChessWager::{self, ChessWagerInstance},
        },
        registry::ChainContracts,
        traits::ChessContracts,
    },
    errors::ChainError,
    types::{TournamentParams, WagerParams, WagerStatus, to_u64},
};

/// Contract handles bound to one EVM chain over HTTP JSON-RPC.
#[derive(Clone, Debug)]
pub struct EthereumChain {
    chess: ChessWagerInstance<RootProvider>,
    tournament: ChessFishTournamentInstance<RootProvider>,
}

impl EthereumChain {
    /// Opens an HTTP provider for `rpc_url`. No request is made yet.
    pub fn provider(rpc_url: &str) -> Result<RootProvider, ChainError> {
        let url = rpc_url
            .parse::<Url>()
            .map_err(|e| ChainError::InvalidUrl {
                url: rpc_url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(RootProvider::new_http(url))
    }

    /// Asks the node which chain it serves.
    pub async fn resolve_chain_id(provider: &RootProvider) -> Result<u64, ChainError> {
        Ok(provider.get_chain_id().await?)
    }

    pub fn new(provider: RootProvider, chain_id: u64, contracts: &ChainContracts) -> Self {
        info!(
            chain_id,
            chess_wager = %contracts.chess_wager,
            tournament = %contracts.tournament,
            "Binding contracts"
        );

        Self {
            chess: ChessWager::new(contracts.chess_wager, provider.clone()),
            tournament: ChessFishTournament::new(contracts.tournament, provider),
        }
    }
}

#[async_trait]
impl ChessContracts for EthereumChain {
    async fn wager_count(&self) -> Result<u64, ChainError> {
        let count = self
            .chess
            .getAllWagersCount()
            .call()
            .await
            .map_err(ChainError::contract("getAllWagersCount"))?;
        to_u64(count, "getAllWagersCount")
    }

    async fn wager_at(&self, index: u64) -> Result<Address, ChainError> {
        self.chess
            .allWagers(U256::from(index))
            .call()
            .await
            .map_err(ChainError::contract("allWagers"))
    }

    async fn wager_params(&self, wager: Address) -> Result<WagerParams, ChainError> {
        let raw = self
            .chess
            .gameWagers(wager)
            .call()
            .await
            .map_err(ChainError::contract("gameWagers"))?;

        Ok(WagerParams {
            player0: raw.player0,
            player1: raw.player1,
            wager_token: raw.wagerToken,
            wager_amount: raw.wager,
            number_of_games: raw.numberOfGames,
            is_in_progress: raw.hasPlayerAccepted,
            time_limit: raw.timeLimit,
            time_last_move: raw.timeLastMove,
            time_player0: raw.timePlayer0,
            time_player1: raw.timePlayer1,
            is_tournament: raw.isTournament,
        })
    }

    async fn wager_status(&self, wager: Address) -> Result<WagerStatus, ChainError> {
        let raw = self
            .chess
            .wagerStatus(wager)
            .call()
            .await
            .map_err(ChainError::contract("wagerStatus"))?;

        Ok(WagerStatus {
            wins_player0: raw.winsPlayer0,
            wins_player1: raw.winsPlayer1,
        })
    }

    async fn game_length(&self, wager: Address) -> Result<u64, ChainError> {
        let length = self
            .chess
            .getGameLength(wager)
            .call()
            .await
            .map_err(ChainError::contract("getGameLength"))?;
        to_u64(length, "getGameLength")
    }

    async fn game_moves(&self, wager: Address, game: u64) -> Result<Vec<u16>, ChainError> {
        let game_moves = self
            .chess
            .getGameMoves(wager, U256::from(game))
            .call()
            .await
            .map_err(ChainError::contract("getGameMoves"))?;
        Ok(game_moves.moves)
    }

    async fn hex_to_move(&self, encoded: u16) -> Result<String, ChainError> {
        self.chess
            .hexToMove(encoded)
            .call()
            .await
            .map_err(ChainError::contract("hexToMove"))
    }

    async fn tournament_count(&self) -> Result<u64, ChainError> {
        let nonce = self
            .tournament
            .tournamentNonce()
            .call()
            .await
            .map_err(ChainError::contract("tournamentNonce"))?;
        to_u64(nonce, "tournamentNonce")
    }

    async fn tournament(&self, nonce: u64) -> Result<TournamentParams, ChainError> {
        let raw = self
            .tournament
            .tournaments(U256::from(nonce))
            .call()
            .await
            .map_err(ChainError::contract("tournaments"))?;

        Ok(TournamentParams {
            number_of_players: raw.numberOfPlayers,
            number_of_games: raw.numberOfGames,
            token: raw.token,
            token_amount: raw.tokenAmount,
            is_in_progress: raw.isInProgress,
            start_time: raw.startTime,
            time_limit: raw.timeLimit,
            is_complete: raw.isComplete,
            is_tournament: raw.isTournament,
        })
    }

    async fn tournament_players(&self, nonce: u64) -> Result<Vec<Address>, ChainError> {
        self.tournament
            .getTournamentPlayers(U256::from(nonce))
            .call()
            .await
            .map_err(ChainError::contract("getTournamentPlayers"))
    }
}
