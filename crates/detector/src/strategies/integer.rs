//! Integer-ratio arbitrage: a market ratio like 3.37:1 sits between two whole
//! ratios that other traders tend to list at.

use tracing::debug;

use market_core::{
    format_ratio, parse_ratio, BasicOpportunity, BasicStrategy, EngineConfig, MarketSnapshot,
    OpportunitySet,
};

use super::{Strategy, StrategyContext};

pub fn find_integer_ratio(snapshot: &MarketSnapshot, config: &EngineConfig) -> Option<BasicOpportunity> {
    let ratio = parse_ratio(&snapshot.market_ratio);
    if ratio <= 0.0 {
        return None;
    }

    let floor = ratio.floor();
    let ceil = floor + 1.0;

    // Buy at the whole ratio below, sell at market. Undefined below 1:1.
    let floor_profit = (floor >= 1.0).then(|| (ratio - floor) / floor);
    // Buy at market, sell at the whole ratio above
    let ceil_profit = (ceil - ratio) / ratio;

    let threshold = config.min_profit_threshold;
    let volume = config.conservative_volume.min(config.max_trade_volume);

    let opportunity = match floor_profit {
        Some(profit) if profit > ceil_profit && profit > threshold => BasicOpportunity {
            strategy: BasicStrategy::IntegerArbitrage,
            buy_currency: snapshot.have_currency.clone(),
            sell_currency: snapshot.want_currency.clone(),
            buy_ratio: format_ratio(floor),
            sell_ratio: snapshot.market_ratio.clone(),
            profit_fraction: profit,
            volume,
            confidence: (profit * 2.0).min(1.0),
        },
        _ if ceil_profit > threshold => BasicOpportunity {
            strategy: BasicStrategy::IntegerArbitrage,
            buy_currency: snapshot.want_currency.clone(),
            sell_currency: snapshot.have_currency.clone(),
            buy_ratio: snapshot.market_ratio.clone(),
            sell_ratio: format_ratio(ceil),
            profit_fraction: ceil_profit,
            volume,
            confidence: (ceil_profit * 2.0).min(1.0),
        },
        _ => return None,
    };

    debug!(
        ratio,
        profit = opportunity.profit_fraction,
        buy = %opportunity.buy_ratio,
        sell = %opportunity.sell_ratio,
        "Integer-ratio opportunity"
    );
    Some(opportunity)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerRatioStrategy;

impl Strategy for IntegerRatioStrategy {
    fn name(&self) -> &'static str {
        "integer_ratio"
    }

    fn contribute(&self, ctx: &StrategyContext<'_>, out: &mut OpportunitySet) {
        out.basic.extend(find_integer_ratio(ctx.snapshot, ctx.config));
    }
}
