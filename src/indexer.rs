use std::{sync::Arc, time::Duration};

use chrono::{TimeDelta, Utc};
use tokio::{
    sync::{Mutex, watch},
    time::{MissedTickBehavior, interval},
};
use tracing::{error, info, warn};

use crate::{
    aggregators::{WagerEnumeration, analytics, leaderboard, tournaments},
    chains::{ChainContext, ethereum::EthereumChain, registry::ContractRegistry},
    config::{ChainEndpoint, IndexerConfig},
    errors::{ChainError, IndexerError},
    retry::{RetryPolicy, with_timeout},
    store::SnapshotSink,
};

/// Where the orchestrator is within the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    SelectingChain,
    Binding,
    Aggregating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed { chains_indexed: usize },
    /// Another cycle was still running.
    Skipped,
}

pub struct Indexer {
    endpoints: Vec<ChainEndpoint>,
    registry: ContractRegistry,
    sink: Arc<dyn SnapshotSink>,
    retry: RetryPolicy,
    polling_interval: Duration,
    leaderboard_enumeration: WagerEnumeration,
    cycle_guard: Mutex<()>,
    state: watch::Sender<CycleState>,
}

impl Indexer {
    pub fn new(config: &IndexerConfig, sink: Arc<dyn SnapshotSink>) -> Result<Self, ChainError> {
        let registry = config.registry()?;
        info!(
            endpoints = config.chains.len(),
            registered_chains = registry.len(),
            "Initialized indexer"
        );

        Ok(Self {
            endpoints: config.chains.clone(),
            registry,
            sink,
            retry: config.retry_policy(),
            polling_interval: config.polling_interval(),
            leaderboard_enumeration: config.core.leaderboard_enumeration,
            cycle_guard: Mutex::new(()),
            state: watch::channel(CycleState::Idle).0,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<CycleState> {
        self.state.subscribe()
    }

    /// Runs a cycle now and then once every polling interval, forever.
    pub async fn start(&self) -> anyhow::Result<()> {
        info!("Starting indexer service");

        let mut cycle_interval = interval(self.polling_interval);
        cycle_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            cycle_interval.tick().await;

            match self.run_cycle().await {
                CycleOutcome::Completed { chains_indexed } => {
                    info!(chains_indexed, "Cycle finished");
                }
                CycleOutcome::Skipped => warn!("Previous cycle still running, skipping"),
            }
            self.log_next_run();
        }
    }

    /// Indexes every configured endpoint once, in order.
    ///
    /// `start` awaits each cycle before the next tick, so it never overlaps
    /// itself. The guard covers callers driving `run_cycle` directly, which
    /// get [`CycleOutcome::Skipped`] while another cycle holds it.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Ok(_guard) = self.cycle_guard.try_lock() else {
            return CycleOutcome::Skipped;
        };

        let mut chains_indexed = 0;
        for endpoint in &self.endpoints {
            self.state.send_replace(CycleState::SelectingChain);
            info!(chain = %endpoint.name, rpc_url = %endpoint.rpc_url, "Selecting chain");

            self.state.send_replace(CycleState::Binding);
            let ctx = match self.bind_chain(endpoint).await {
                Ok(ctx) => ctx,
                Err(e) => {
                    error!(chain = %endpoint.name, error = %e, "Skipping chain this cycle");
                    continue;
                }
            };

            self.state.send_replace(CycleState::Aggregating);
            self.index_chain(&ctx).await;
            chains_indexed += 1;
        }
        self.state.send_replace(CycleState::Idle);

        CycleOutcome::Completed { chains_indexed }
    }

    /// Connects to `endpoint` and binds the contracts registered for the
    /// chain it reports. Nothing here is retried.
    async fn bind_chain(&self, endpoint: &ChainEndpoint) -> Result<ChainContext, IndexerError> {
        let connect_error = |source| IndexerError::Connect {
            rpc_url: endpoint.rpc_url.clone(),
            source,
        };

        let provider = EthereumChain::provider(&endpoint.rpc_url).map_err(connect_error)?;
        let chain_id = with_timeout(&self.retry, EthereumChain::resolve_chain_id(&provider))
            .await
            .map_err(connect_error)?;

        let contracts = self
            .registry
            .get(chain_id)
            .ok_or(IndexerError::UnknownChain(chain_id))?;
        let chain = EthereumChain::new(provider, chain_id, contracts);

        Ok(ChainContext::new(
            chain_id,
            Arc::new(chain),
            self.retry.clone(),
        ))
    }

    /// Runs the three aggregators against one chain. Each handles its own
    /// failures, so a failed run never keeps the next from starting.
    pub async fn index_chain(&self, ctx: &ChainContext) {
        let sink = self.sink.as_ref();

        match analytics::run(ctx, sink, WagerEnumeration::Counted).await {
            Some(wagers) => info!(chain_id = ctx.chain_id, wagers = wagers.len(), "Analytics done"),
            None => warn!(chain_id = ctx.chain_id, "Analytics aborted"),
        }

        let board = leaderboard::run(ctx, sink, self.leaderboard_enumeration).await;
        info!(chain_id = ctx.chain_id, players = board.len(), "Leaderboard done");

        match tournaments::run(ctx, sink).await {
            Ok(snapshots) => {
                info!(chain_id = ctx.chain_id, tournaments = snapshots.len(), "Tournaments done")
            }
            Err(e) => error!(chain_id = ctx.chain_id, error = %e, "Failed to index tournaments"),
        }
    }

    fn log_next_run(&self) {
        let minutes = self.polling_interval.as_secs() / 60;
        match TimeDelta::from_std(self.polling_interval) {
            Ok(delta) => info!(
                next_run = %(Utc::now() + delta).format("%Y-%m-%d %H:%M:%S UTC"),
                "Next cycle in {} minutes",
                minutes
            ),
            Err(_) => info!("Next cycle in {} minutes", minutes),
        }
    }
}
