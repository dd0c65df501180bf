//! Opportunity engine: record, detect, report

use std::time::Instant;
use tracing::{debug, info};

use market_core::{CoreResult, EngineConfig, MarketSnapshot, OpportunitySet};
use market_history::{HistoryStore, SharedHistory};

use crate::strategies::{default_strategies, Strategy, StrategyContext};

/// Runs every strategy against one snapshot at a time
pub struct OpportunityEngine {
    config: EngineConfig,
    strategies: Vec<Box<dyn Strategy>>,
}

impl OpportunityEngine {
    /// Fails only on invalid configuration, before any snapshot is seen
    pub fn new(config: EngineConfig) -> CoreResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            strategies: default_strategies(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// History store sized for this engine's window
    pub fn new_history(&self) -> HistoryStore {
        HistoryStore::from_config(&self.config)
    }

    /// Record `snapshot` into `history`, then run all strategies.
    ///
    /// Always records, even when nothing is found. Malformed market data
    /// yields empty lists, never an error.
    pub fn analyze(&self, snapshot: &MarketSnapshot, history: &mut HistoryStore) -> OpportunitySet {
        let start = Instant::now();

        history.record(snapshot.pair(), snapshot);

        let ctx = StrategyContext {
            snapshot,
            history: &*history,
            config: &self.config,
        };

        let mut opportunities = OpportunitySet::default();
        for strategy in &self.strategies {
            let before = opportunities.len();
            strategy.contribute(&ctx, &mut opportunities);
            debug!(
                strategy = strategy.name(),
                found = opportunities.len() - before,
                "Strategy evaluated"
            );
        }

        info!(
            pair = %snapshot.pair(),
            basic = opportunities.basic.len(),
            triangle = opportunities.triangle.len(),
            market_making = opportunities.market_making.len(),
            elapsed = ?start.elapsed(),
            "Analyzed snapshot"
        );

        opportunities
    }

    /// Same as [`analyze`](Self::analyze), holding the shared lock for the
    /// whole call so cross-pair strategies see one consistent history.
    pub fn analyze_shared(&self, snapshot: &MarketSnapshot, history: &SharedHistory) -> OpportunitySet {
        let mut guard = history.lock();
        self.analyze(snapshot, &mut guard)
    }

    pub fn stats(&self, history: &HistoryStore) -> EngineStats {
        let history = history.stats();

        EngineStats {
            strategy_count: self.strategies.len(),
            pair_count: history.pair_count,
            entry_count: history.entry_count,
            currency_count: history.currency_count,
        }
    }
}

/// Engine statistics
#[derive(Debug, Clone)]
pub struct EngineStats {
    pub strategy_count: usize,
    pub pair_count: usize,
    pub entry_count: usize,
    pub currency_count: usize,
}
