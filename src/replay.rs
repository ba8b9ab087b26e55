use alloy::primitives::Address;
use shakmaty::{
    Chess, EnPassantMode, Move, Position, fen::Fen, san::SanPlus, uci::UciMove,
};
use tracing::{debug, warn};

use crate::{
    chains::ChainContext,
    errors::ReplayError,
    retry::{retry_with_delay, with_timeout},
};

/// Plays `moves` from the standard starting position and returns the FEN of
/// the final position.
///
/// Each move may be SAN (`Nf3`, `exd5`, `O-O`, `e8=Q+`) or long algebraic
/// (`g1f3`, `e7e8q`).
pub fn replay_moves<S: AsRef<str>>(moves: &[S]) -> Result<String, ReplayError> {
    let mut position = Chess::default();

    for (ply, notation) in moves.iter().enumerate() {
        let notation = notation.as_ref().trim();
        let mv = parse_move(&position, ply, notation)?;
        position = position.play(mv).map_err(|_| ReplayError::Illegal {
            ply,
            notation: notation.to_string(),
        })?;
    }

    Ok(Fen::from_position(&position, EnPassantMode::Legal).to_string())
}

fn parse_move(position: &Chess, ply: usize, notation: &str) -> Result<Move, ReplayError> {
    let illegal = || ReplayError::Illegal {
        ply,
        notation: notation.to_string(),
    };

    // Long algebraic like `g1f3` can also parse as a pawn SAN, so a SAN that
    // does not resolve still gets a chance as UCI.
    let san = notation.parse::<SanPlus>().ok();
    if let Some(mv) = san.and_then(|san| san.san.to_move(position).ok()) {
        return Ok(mv);
    }

    match notation.parse::<UciMove>() {
        Ok(uci) => uci.to_move(position).map_err(|_| illegal()),
        Err(_) if san.is_some() => Err(illegal()),
        Err(_) => Err(ReplayError::Unparseable {
            ply,
            notation: notation.to_string(),
        }),
    }
}

/// Position of the most recent game of `wager`, or an empty string when it
/// cannot be determined.
pub async fn fen_for_match(ctx: &ChainContext, wager: Address) -> String {
    match replay_latest_game(ctx, wager).await {
        Ok(fen) => fen,
        Err(e) => {
            warn!(chain_id = ctx.chain_id, %wager, error = %e, "Failed to replay game moves");
            String::new()
        }
    }
}

async fn replay_latest_game(ctx: &ChainContext, wager: Address) -> Result<String, ReplayError> {
    let game = with_timeout(&ctx.retry, ctx.contracts.game_length(wager))
        .await?
        .saturating_sub(1);

    let encoded = retry_with_delay(&ctx.retry, "getGameMoves", || {
        ctx.contracts.game_moves(wager, game)
    })
    .await?;

    let mut notation = Vec::with_capacity(encoded.len());
    for mv in encoded {
        notation.push(with_timeout(&ctx.retry, ctx.contracts.hex_to_move(mv)).await?);
    }
    debug!(chain_id = ctx.chain_id, %wager, game, moves = notation.len(), "Replaying game");

    replay_moves(&notation)
}
