//! Triangle arbitrage: A -> B -> C -> A over recorded history

use rayon::prelude::*;
use tracing::debug;

use market_core::{
    format_ratio, CurrencyPair, EngineConfig, OpportunitySet, TriangleLeg, TriangleOpportunity,
};
use market_history::{HistoryEntry, HistoryStore};

use super::{Strategy, StrategyContext};

/// Every ordered triple of distinct known currencies whose three legs have a
/// usable latest rate and whose round trip clears the profit threshold.
/// Sorted by profit descending; equal profits keep discovery order.
pub fn find_triangles(history: &HistoryStore, config: &EngineConfig) -> Vec<TriangleOpportunity> {
    let currencies: Vec<&String> = history.known_currencies().iter().collect();
    if currencies.len() < 3 {
        return Vec::new();
    }

    // Exhaustive O(n^3); the currency universe is small
    let mut opportunities: Vec<TriangleOpportunity> = currencies
        .par_iter()
        .flat_map_iter(|&c1| {
            let currencies = &currencies;
            currencies.iter().flat_map(move |&c2| {
                currencies
                    .iter()
                    .filter_map(move |&c3| evaluate(history, config, c1, c2, c3))
            })
        })
        .collect();

    opportunities.sort_by(|a, b| b.total_profit_fraction.total_cmp(&a.total_profit_fraction));
    opportunities
}

fn evaluate(
    history: &HistoryStore,
    config: &EngineConfig,
    c1: &str,
    c2: &str,
    c3: &str,
) -> Option<TriangleOpportunity> {
    if c1 == c2 || c2 == c3 || c3 == c1 {
        return None;
    }

    let first = leg_entry(history, c1, c2)?;
    let second = leg_entry(history, c2, c3)?;
    let third = leg_entry(history, c3, c1)?;

    let product = first.best_rate * second.best_rate * third.best_rate;
    if !product.is_finite() {
        return None;
    }

    let profit = product - 1.0;
    if profit <= config.min_profit_threshold {
        return None;
    }

    let safe_volume = first
        .volume
        .min(second.volume)
        .min(third.volume)
        .min(config.max_trade_volume);

    debug!(path = %format!("{c1} -> {c2} -> {c3} -> {c1}"), profit, safe_volume, "Triangle opportunity");

    Some(TriangleOpportunity {
        legs: [leg(first), leg(second), leg(third)],
        total_profit_fraction: profit,
        safe_volume,
        confidence: (profit * 3.0).min(1.0),
    })
}

fn leg_entry<'a>(history: &'a HistoryStore, from: &str, to: &str) -> Option<&'a HistoryEntry> {
    // Keyed by (want, have): one unit of `from` is quoted in `to`
    history.latest_priced(&CurrencyPair::new(from, to))
}

fn leg(entry: &HistoryEntry) -> TriangleLeg {
    TriangleLeg {
        from_currency: entry.pair.base.clone(),
        to_currency: entry.pair.quote.clone(),
        ratio: format_ratio(entry.best_rate),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TriangleStrategy;

impl Strategy for TriangleStrategy {
    fn name(&self) -> &'static str {
        "triangle"
    }

    fn contribute(&self, ctx: &StrategyContext<'_>, out: &mut OpportunitySet) {
        out.triangle.extend(find_triangles(ctx.history, ctx.config));
    }
}
