//! Opportunity detection strategies
//!
//! Each strategy is a plain function over the current snapshot and a read-only
//! view of history; the `Strategy` wrappers let the engine run them uniformly.
//! Every strategy resolves bad input to "no opportunity" instead of an error.

mod integer;
mod market_making;
mod spread;
mod triangle;

pub use integer::{find_integer_ratio, IntegerRatioStrategy};
pub use market_making::{find_market_making, MarketMakingStrategy};
pub use spread::{find_spread, SpreadStrategy};
pub use triangle::{find_triangles, TriangleStrategy};

use market_core::{EngineConfig, MarketSnapshot, OpportunitySet};
use market_history::HistoryStore;

/// Inputs shared by all strategies for one analysis pass
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    pub snapshot: &'a MarketSnapshot,
    pub history: &'a HistoryStore,
    pub config: &'a EngineConfig,
}

/// Strategy trait for different opportunity types
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Append this strategy's findings to `out`, in the strategy's own order
    fn contribute(&self, ctx: &StrategyContext<'_>, out: &mut OpportunitySet);
}

/// The four detectors, in the order their results are reported
pub fn default_strategies() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(IntegerRatioStrategy),
        Box::new(SpreadStrategy),
        Box::new(TriangleStrategy),
        Box::new(MarketMakingStrategy),
    ]
}
