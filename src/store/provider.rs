use alloy::primitives::Address;
use async_trait::async_trait;
use sqlx::{
    Connection, PgConnection, Postgres,
    postgres::PgArguments,
    query::Query,
};
use tracing::{debug, info, warn};

use crate::{
    store::{SnapshotSink, errors::StoreError},
    types::{ChainSummary, PlayerStats, TournamentSnapshot, WagerSnapshot},
};

const UPSERT_WAGER: &str = r#"
    INSERT INTO chess_games (
        chain_id, match_address, player0_address, player1_address, wager_token,
        wager_amount, number_of_games, is_in_progress, time_limit, time_last_move,
        time_player0, time_player1, is_player_turn, is_tournament, fen_string
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
    ON CONFLICT (match_address) DO UPDATE SET
        chain_id = EXCLUDED.chain_id,
        player0_address = EXCLUDED.player0_address,
        player1_address = EXCLUDED.player1_address,
        wager_token = EXCLUDED.wager_token,
        wager_amount = EXCLUDED.wager_amount,
        number_of_games = EXCLUDED.number_of_games,
        is_in_progress = EXCLUDED.is_in_progress,
        time_limit = EXCLUDED.time_limit,
        time_last_move = EXCLUDED.time_last_move,
        time_player0 = EXCLUDED.time_player0,
        time_player1 = EXCLUDED.time_player1,
        is_player_turn = EXCLUDED.is_player_turn,
        is_tournament = EXCLUDED.is_tournament,
        fen_string = EXCLUDED.fen_string
"#;

const UPSERT_CHAIN_SUMMARY: &str = r#"
    INSERT INTO chess_analytics (chain_id, number_of_games, number_of_wagers)
    VALUES ($1, $2, $3)
    ON CONFLICT (chain_id) DO UPDATE SET
        number_of_games = EXCLUDED.number_of_games,
        number_of_wagers = EXCLUDED.number_of_wagers
"#;

const UPSERT_PLAYER_STATS: &str = r#"
    INSERT INTO leaderboard (chain_id, address_player, total_games, games_won)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (chain_id, address_player) DO UPDATE SET
        total_games = EXCLUDED.total_games,
        games_won = EXCLUDED.games_won
"#;

const UPSERT_TOURNAMENT: &str = r#"
    INSERT INTO tournaments (
        chain_id, tournament_nonce, number_of_players, players, number_of_games,
        token, token_amount, is_in_progress, start_time, time_limit,
        is_complete, is_tournament
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
    ON CONFLICT (chain_id, tournament_nonce) DO UPDATE SET
        number_of_players = EXCLUDED.number_of_players,
        players = EXCLUDED.players,
        number_of_games = EXCLUDED.number_of_games,
        token = EXCLUDED.token,
        token_amount = EXCLUDED.token_amount,
        is_in_progress = EXCLUDED.is_in_progress,
        start_time = EXCLUDED.start_time,
        time_limit = EXCLUDED.time_limit,
        is_complete = EXCLUDED.is_complete,
        is_tournament = EXCLUDED.is_tournament
"#;

/// Postgres-backed sink.
///
/// Connections are not pooled: every upsert opens its own connection and
/// closes it again whether or not the statement succeeded.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    db_url: String,
}

impl PostgresStore {
    pub fn new(db_url: &str, require_ssl: bool) -> Self {
        let db_url = if require_ssl {
            with_ssl_mode(db_url)
        } else {
            db_url.to_string()
        };
        PostgresStore { db_url }
    }

    /// Creates the four snapshot tables if they do not exist yet.
    pub async fn create_tables(&self) -> Result<(), StoreError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS chess_games (
                id SERIAL PRIMARY KEY,
                chain_id BIGINT NOT NULL,
                match_address VARCHAR(42) UNIQUE NOT NULL,
                player0_address VARCHAR(42) NOT NULL,
                player1_address VARCHAR(42) NOT NULL,
                wager_token VARCHAR(42) NOT NULL,
                wager_amount NUMERIC NOT NULL,
                number_of_games BIGINT NOT NULL,
                is_in_progress BOOLEAN NOT NULL,
                time_limit BIGINT NOT NULL,
                time_last_move BIGINT NOT NULL,
                time_player0 BIGINT NOT NULL,
                time_player1 BIGINT NOT NULL,
                is_player_turn BOOLEAN NOT NULL DEFAULT FALSE,
                is_tournament BOOLEAN NOT NULL,
                fen_string TEXT NOT NULL DEFAULT ''
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS chess_analytics (
                id SERIAL PRIMARY KEY,
                chain_id BIGINT UNIQUE NOT NULL,
                number_of_games BIGINT NOT NULL,
                number_of_wagers BIGINT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS leaderboard (
                id SERIAL PRIMARY KEY,
                chain_id BIGINT NOT NULL,
                address_player VARCHAR(42) NOT NULL,
                total_games BIGINT NOT NULL,
                games_won BIGINT NOT NULL,
                UNIQUE (chain_id, address_player)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS tournaments (
                id SERIAL PRIMARY KEY,
                chain_id BIGINT NOT NULL,
                tournament_nonce BIGINT NOT NULL,
                number_of_players BIGINT NOT NULL,
                players TEXT[] NOT NULL DEFAULT '{}',
                number_of_games BIGINT NOT NULL,
                token VARCHAR(42) NOT NULL,
                token_amount NUMERIC NOT NULL,
                is_in_progress BOOLEAN NOT NULL,
                start_time BIGINT NOT NULL,
                time_limit BIGINT NOT NULL,
                is_complete BOOLEAN NOT NULL,
                is_tournament BOOLEAN NOT NULL,
                UNIQUE (chain_id, tournament_nonce)
            )
            "#,
        ];

        let mut conn = PgConnection::connect(&self.db_url)
            .await
            .map_err(StoreError::Connection)?;

        let mut result = Ok(());
        for sql in statements {
            if let Err(e) = sqlx::query(sql).execute(&mut conn).await {
                result = Err(StoreError::Database(e));
                break;
            }
        }
        close(conn).await;

        result
    }

    async fn upsert(
        &self,
        entity: &'static str,
        query: Query<'_, Postgres, PgArguments>,
    ) -> Result<(), StoreError> {
        let mut conn = PgConnection::connect(&self.db_url)
            .await
            .map_err(StoreError::Connection)?;

        let result = query.execute(&mut conn).await;
        close(conn).await;

        let done = result.map_err(StoreError::Database)?;
        debug!(entity, rows = done.rows_affected(), "Upserted row");
        Ok(())
    }
}

async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close database connection: {}", e);
    }
}

/// Appends `sslmode=require` unless the URL already chooses an ssl mode.
fn with_ssl_mode(db_url: &str) -> String {
    if db_url.contains("sslmode=") {
        return db_url.to_string();
    }
    let separator = if db_url.contains('?') { '&' } else { '?' };
    format!("{db_url}{separator}sslmode=require")
}

// Postgres has no unsigned integers.
fn bigint(column: &'static str, value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::OutOfRange { column, value })
}

#[async_trait]
impl SnapshotSink for PostgresStore {
    async fn upsert_wager(&self, wager: &WagerSnapshot) -> Result<(), StoreError> {
        let query = sqlx::query(UPSERT_WAGER)
            .bind(bigint("chain_id", wager.chain_id)?)
            .bind(&wager.match_address)
            .bind(&wager.player0_address)
            .bind(&wager.player1_address)
            .bind(&wager.wager_token)
            .bind(&wager.wager_amount)
            .bind(wager.number_of_games)
            .bind(wager.is_in_progress)
            .bind(wager.time_limit)
            .bind(wager.time_last_move)
            .bind(wager.time_player0)
            .bind(wager.time_player1)
            .bind(wager.is_player_turn)
            .bind(wager.is_tournament)
            .bind(&wager.fen_string);

        self.upsert("chess_games", query).await
    }

    async fn upsert_chain_summary(&self, summary: &ChainSummary) -> Result<(), StoreError> {
        let query = sqlx::query(UPSERT_CHAIN_SUMMARY)
            .bind(bigint("chain_id", summary.chain_id)?)
            .bind(summary.number_of_games)
            .bind(summary.number_of_wagers);

        self.upsert("chess_analytics", query).await?;
        info!(
            chain_id = summary.chain_id,
            games = summary.number_of_games,
            wagers = summary.number_of_wagers,
            "Stored chain summary"
        );
        Ok(())
    }

    async fn upsert_player_stats(
        &self,
        chain_id: u64,
        player: Address,
        stats: &PlayerStats,
    ) -> Result<(), StoreError> {
        let query = sqlx::query(UPSERT_PLAYER_STATS)
            .bind(bigint("chain_id", chain_id)?)
            .bind(player.to_string())
            .bind(stats.total_games)
            .bind(stats.games_won);

        self.upsert("leaderboard", query).await
    }

    async fn upsert_tournament(&self, tournament: &TournamentSnapshot) -> Result<(), StoreError> {
        let query = sqlx::query(UPSERT_TOURNAMENT)
            .bind(bigint("chain_id", tournament.chain_id)?)
            .bind(bigint("tournament_nonce", tournament.tournament_nonce)?)
            .bind(tournament.number_of_players)
            .bind(&tournament.players)
            .bind(tournament.number_of_games)
            .bind(&tournament.token)
            .bind(&tournament.token_amount)
            .bind(tournament.is_in_progress)
            .bind(tournament.start_time)
            .bind(tournament.time_limit)
            .bind(tournament.is_complete)
            .bind(tournament.is_tournament);

        self.upsert("tournaments", query).await
    }
}
