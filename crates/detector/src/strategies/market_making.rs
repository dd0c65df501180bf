//! Market-making scoring: high volume, low volatility, decent spread

use tracing::debug;

use market_core::{
    format_ratio, EngineConfig, MarketMakingOpportunity, MarketSnapshot, OpportunitySet,
};
use market_history::{volatility, HistoryStore};

use super::{Strategy, StrategyContext};

/// Score every tracked pair with enough history against the book of the
/// *current* snapshot. Sorted by confidence descending, ties in pair order.
pub fn find_market_making(
    snapshot: &MarketSnapshot,
    history: &HistoryStore,
    config: &EngineConfig,
) -> Vec<MarketMakingOpportunity> {
    let Some((bid, ask)) = book_edges(snapshot) else {
        return Vec::new();
    };
    let spread = (ask - bid) / bid;
    let spread_score = (spread * 5.0).min(1.0);

    let mut opportunities: Vec<MarketMakingOpportunity> = history
        .pairs()
        .filter(|(_, entries)| entries.len() >= config.mm_min_history)
        .filter_map(|(pair, entries)| {
            let volume = entries.last()?.volume;
            let volatility = volatility(entries);

            let volume_score = (volume as f64 / 1000.0).min(1.0);
            let volatility_score = (1.0 - volatility * 10.0).max(0.0);
            let confidence = (volume_score + volatility_score + spread_score) / 3.0;

            if confidence <= config.mm_confidence_cutoff {
                return None;
            }

            debug!(%pair, spread, volume, volatility, confidence, "Market-making opportunity");

            Some(MarketMakingOpportunity {
                pair: pair.clone(),
                bid: format_ratio(bid),
                ask: format_ratio(ask),
                spread_fraction: spread,
                volume: volume.min(config.max_trade_volume),
                volatility,
                confidence,
            })
        })
        .collect();

    opportunities.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    opportunities
}

/// Lowest usable available rate and highest usable competing rate
fn book_edges(snapshot: &MarketSnapshot) -> Option<(f64, f64)> {
    let bid = snapshot
        .available_quotes
        .iter()
        .map(|q| q.rate())
        .filter(|r| *r > 0.0)
        .reduce(f64::min)?;
    let ask = snapshot
        .competing_quotes
        .iter()
        .map(|q| q.rate())
        .filter(|r| *r > 0.0)
        .reduce(f64::max)?;
    Some((bid, ask))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarketMakingStrategy;

impl Strategy for MarketMakingStrategy {
    fn name(&self) -> &'static str {
        "market_making"
    }

    fn contribute(&self, ctx: &StrategyContext<'_>, out: &mut OpportunitySet) {
        out.market_making
            .extend(find_market_making(ctx.snapshot, ctx.history, ctx.config));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::fixtures::{minutes, observe, snapshot};
    use market_core::CurrencyPair;

    fn book() -> MarketSnapshot {
        snapshot(
            "divine",
            "chaos",
            "100:1",
            &[("104:1", 5), ("100:1", 5), ("junk", 5)],
            &[("110:1", 5), ("120:1", 5)],
        )
    }

    fn steady_history(pair: (&str, &str), count: i64, stock: u64) -> HistoryStore {
        let mut history = HistoryStore::default();
        for i in 0..count {
            observe(&mut history, pair.0, pair.1, "100:1", stock, minutes(i));
        }
        history
    }

    #[test]
    fn test_scores_steady_liquid_pair() {
        let history = steady_history(("exalted", "chaos"), 5, 800);
        let opps = find_market_making(&book(), &history, &EngineConfig::default());

        assert_eq!(opps.len(), 1);
        let opp = &opps[0];
        // The historical pair is scored against the current book
        assert_eq!(opp.pair, CurrencyPair::new("exalted", "chaos"));
        assert_eq!(opp.bid, "100:1");
        assert_eq!(opp.ask, "120:1");
        assert!((opp.spread_fraction - 0.2).abs() < 1e-12);
        assert_eq!(opp.volatility, 0.0);
        assert_eq!(opp.volume, 800);
        // (0.8 + 1.0 + 1.0) / 3
        assert!((opp.confidence - 2.8 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_history_is_never_scored() {
        let history = steady_history(("exalted", "chaos"), 4, 5_000);
        assert!(find_market_making(&book(), &history, &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_confidence_cutoff() {
        // volume 0, no volatility, spread 0.02 -> (0 + 1 + 0.1) / 3 < 0.5
        let history = steady_history(("exalted", "chaos"), 5, 0);
        let tight = snapshot("a", "b", "1:1", &[("100:1", 1)], &[("102:1", 1)]);
        assert!(find_market_making(&tight, &history, &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_volatile_pair_scores_lower() {
        let mut history = steady_history(("exalted", "chaos"), 5, 1000);
        for (i, ratio) in ["100:1", "130:1", "80:1", "120:1", "90:1"].iter().enumerate() {
            observe(&mut history, "vaal", "chaos", ratio, 1000, minutes(i as i64));
        }

        let opps = find_market_making(&book(), &history, &EngineConfig::default());
        assert_eq!(opps.len(), 2);
        assert_eq!(opps[0].pair.base, "exalted");
        assert_eq!(opps[1].pair.base, "vaal");
        assert!(opps[1].volatility > 0.0);
        assert!(opps[0].confidence > opps[1].confidence);
    }

    #[test]
    fn test_empty_or_unusable_book() {
        let history = steady_history(("exalted", "chaos"), 5, 800);
        let config = EngineConfig::default();

        let no_competing = snapshot("a", "b", "1:1", &[("100:1", 1)], &[]);
        assert!(find_market_making(&no_competing, &history, &config).is_empty());

        let junk = snapshot("a", "b", "1:1", &[("x", 1)], &[("110:1", 1)]);
        assert!(find_market_making(&junk, &history, &config).is_empty());
    }

    #[test]
    fn test_volume_capped_but_scored_raw() {
        let history = steady_history(("exalted", "chaos"), 5, 5_000);
        let config = EngineConfig {
            max_trade_volume: 300,
            ..Default::default()
        };
        let opps = find_market_making(&book(), &history, &config);
        assert_eq!(opps[0].volume, 300);
        assert!((opps[0].confidence - 1.0).abs() < 1e-9);
    }
}
