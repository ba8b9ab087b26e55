use std::time::Duration;

use alloy::primitives::Address;
use thiserror::Error;

use crate::{store::errors::StoreError, types::WagerSnapshot};

/// Failures talking to a node or decoding what it returned.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("invalid rpc url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid address `{0}`")]
    InvalidAddress(String),

    #[error("rpc transport error: {0}")]
    Transport(#[from] alloy::transports::TransportError),

    #[error("contract call `{call}` failed: {source}")]
    Contract {
        call: &'static str,
        #[source]
        source: alloy::contract::Error,
    },

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("field `{field}` out of range: {value}")]
    Conversion { field: &'static str, value: String },

    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    #[error("`{call}` failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        call: &'static str,
        attempts: u32,
        last: Box<ChainError>,
    },
}

impl ChainError {
    pub(crate) fn contract(call: &'static str) -> impl FnOnce(alloy::contract::Error) -> Self {
        move |source| ChainError::Contract { call, source }
    }
}

/// Why a move list could not be turned into a position.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("move {ply} `{notation}` is not valid notation")]
    Unparseable { ply: usize, notation: String },

    #[error("move {ply} `{notation}` is illegal in this position")]
    Illegal { ply: usize, notation: String },
}

/// Outcome of building one wager snapshot.
///
/// `Params` is systemic and ends the analytics run for the chain, `Persist`
/// still carries the snapshot that was built.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read parameters of wager {wager}: {source}")]
    Params {
        wager: Address,
        #[source]
        source: ChainError,
    },

    #[error("failed to persist wager {}: {source}", .snapshot.match_address)]
    Persist {
        snapshot: Box<WagerSnapshot>,
        #[source]
        source: StoreError,
    },
}

impl SnapshotError {
    pub fn is_systemic(&self) -> bool {
        matches!(self, SnapshotError::Params { .. })
    }
}

/// Reasons a configured chain is skipped for the current cycle.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("failed to resolve chain id for {rpc_url}: {source}")]
    Connect {
        rpc_url: String,
        #[source]
        source: ChainError,
    },

    #[error("no contracts registered for chain id {0}")]
    UnknownChain(u64),
}
