pub mod contracts;
pub mod ethereum;
pub mod registry;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;

use std::{fmt, sync::Arc};

use crate::{chains::traits::ChessContracts, retry::RetryPolicy};

/// Everything an aggregator needs to read one chain.
///
/// Built fresh for every chain of every cycle and passed down explicitly, so
/// no aggregator can read a chain other than the one it was handed.
#[derive(Clone)]
pub struct ChainContext {
    pub chain_id: u64,
    pub contracts: Arc<dyn ChessContracts>,
    pub retry: RetryPolicy,
}

impl ChainContext {
    pub fn new(chain_id: u64, contracts: Arc<dyn ChessContracts>, retry: RetryPolicy) -> Self {
        Self {
            chain_id,
            contracts,
            retry,
        }
    }
}

impl fmt::Debug for ChainContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainContext")
            .field("chain_id", &self.chain_id)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
