use alloy::sol;

sol! {
    #[sol(rpc)]
    contract ChessWager {
        struct GameMoves {
            uint16[] moves;
        }

        function getAllWagersCount() external view returns (uint256);

        function allWagers(uint256 index) external view returns (address);

        function gameWagers(address wager)
            external
            view
            returns (
                address player0,
                address player1,
                address wagerToken,
                uint256 wager,
                uint256 numberOfGames,
                bool hasPlayerAccepted,
                uint256 timeLimit,
                uint256 timeLastMove,
                uint256 timePlayer0,
                uint256 timePlayer1,
                bool isTournament
            );

        function wagerStatus(address wager)
            external
            view
            returns (bool isPlayer0White, uint256 winsPlayer0, uint256 winsPlayer1);

        function getGameLength(address wager) external view returns (uint256);

        function getGameMoves(address wager, uint256 gameID) external view returns (GameMoves memory);

        function hexToMove(uint16 hexMove) external view returns (string memory algebraic);
    }
}

sol! {
    #[sol(rpc)]
    contract ChessFishTournament {
        function tournamentNonce() external view returns (uint256);

        function tournaments(uint256 nonce)
            external
            view
            returns (
                uint256 numberOfPlayers,
                uint256 numberOfGames,
                address token,
                uint256 tokenAmount,
                bool isInProgress,
                uint256 startTime,
                uint256 timeLimit,
                bool isComplete,
                bool isTournament
            );

        function getTournamentPlayers(uint256 tournamentID) external view returns (address[] memory);
    }
}
