//! Spread arbitrage between the first available and first competing quote

use tracing::debug;

use market_core::{BasicOpportunity, BasicStrategy, EngineConfig, MarketSnapshot, OpportunitySet};

use super::{Strategy, StrategyContext};

pub fn find_spread(snapshot: &MarketSnapshot, config: &EngineConfig) -> Option<BasicOpportunity> {
    // Capture order, not best-of: the first row is what the executor clicks
    let available = snapshot.available_quotes.first()?;
    let competing = snapshot.competing_quotes.first()?;

    let available_rate = available.rate();
    let competing_rate = competing.rate();
    if available_rate <= 0.0 || competing_rate <= 0.0 {
        return None;
    }

    let spread = (available_rate - competing_rate).abs() / available_rate.min(competing_rate);
    if spread <= config.spread_threshold {
        return None;
    }

    debug!(
        pair = %snapshot.pair(),
        available_rate,
        competing_rate,
        spread,
        "Spread opportunity"
    );

    Some(BasicOpportunity {
        strategy: BasicStrategy::SpreadTrading,
        buy_currency: snapshot.have_currency.clone(),
        sell_currency: snapshot.want_currency.clone(),
        buy_ratio: available.ratio.clone(),
        sell_ratio: competing.ratio.clone(),
        profit_fraction: spread,
        volume: config
            .conservative_volume
            .min(available.stock)
            .min(config.max_trade_volume),
        confidence: (spread * 10.0).min(0.9),
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadStrategy;

impl Strategy for SpreadStrategy {
    fn name(&self) -> &'static str {
        "spread"
    }

    fn contribute(&self, ctx: &StrategyContext<'_>, out: &mut OpportunitySet) {
        out.basic.extend(find_spread(ctx.snapshot, ctx.config));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::fixtures::snapshot;

    fn run(available: &[(&str, u64)], competing: &[(&str, u64)]) -> Option<BasicOpportunity> {
        let snap = snapshot("divine", "chaos", "100:1", available, competing);
        find_spread(&snap, &EngineConfig::default())
    }

    #[test]
    fn test_ten_percent_spread() {
        let opp = run(&[("100:1", 250)], &[("110:1", 3)]).unwrap();
        assert!((opp.profit_fraction - 0.1).abs() < 1e-12);
        assert_eq!(opp.confidence, 0.9);
        assert_eq!(opp.volume, 100);
        assert_eq!(opp.buy_ratio, "100:1");
        assert_eq!(opp.sell_ratio, "110:1");
        assert_eq!(opp.buy_currency, "chaos");
        assert_eq!(opp.strategy, BasicStrategy::SpreadTrading);
    }

    #[test]
    fn test_direction_does_not_matter() {
        let opp = run(&[("110:1", 7)], &[("100:1", 3)]).unwrap();
        assert!((opp.profit_fraction - 0.1).abs() < 1e-12);
        assert_eq!(opp.volume, 7);
    }

    #[test]
    fn test_volume_capped_by_max_trade_volume() {
        let snap = snapshot("divine", "chaos", "100:1", &[("100:1", 250)], &[("110:1", 3)]);
        let config = EngineConfig {
            max_trade_volume: 40,
            ..Default::default()
        };
        assert_eq!(find_spread(&snap, &config).unwrap().volume, 40);

        // Stock below both caps still wins
        let thin = snapshot("divine", "chaos", "100:1", &[("100:1", 25)], &[("110:1", 3)]);
        assert_eq!(find_spread(&thin, &config).unwrap().volume, 25);
    }

    #[test]
    fn test_confidence_scales_below_cap() {
        let opp = run(&[("100:1", 10)], &[("106:1", 10)]).unwrap();
        assert!((opp.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_only_first_quotes_are_compared() {
        // A later row would clear the threshold, the first does not
        assert!(run(&[("100:1", 10), ("50:1", 10)], &[("101:1", 10)]).is_none());
    }

    #[test]
    fn test_small_spread_is_ignored() {
        assert!(run(&[("100:1", 10)], &[("104:1", 10)]).is_none());
    }

    #[test]
    fn test_missing_or_unusable_quotes() {
        assert!(run(&[], &[("110:1", 3)]).is_none());
        assert!(run(&[("100:1", 3)], &[]).is_none());
        assert!(run(&[("??", 3)], &[("110:1", 3)]).is_none());
        assert!(run(&[("100:1", 3)], &[("110:0", 3)]).is_none());
    }
}
