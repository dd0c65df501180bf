//! Trading opportunity types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CurrencyPair;

/// Which basic strategy produced an opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicStrategy {
    /// Market ratio sits far enough from a whole number
    #[serde(rename = "Integer Arbitrage")]
    IntegerArbitrage,
    /// First available vs first competing quote
    #[serde(rename = "Spread Trading")]
    SpreadTrading,
}

impl BasicStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            BasicStrategy::IntegerArbitrage => "Integer Arbitrage",
            BasicStrategy::SpreadTrading => "Spread Trading",
        }
    }
}

impl fmt::Display for BasicStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Buy one side, sell the other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicOpportunity {
    pub strategy: BasicStrategy,
    pub buy_currency: String,
    pub sell_currency: String,
    pub buy_ratio: String,
    pub sell_ratio: String,
    pub profit_fraction: f64,
    pub volume: u64,
    pub confidence: f64,  // 0.0 - 1.0
}

/// One hop of a triangle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangleLeg {
    pub from_currency: String,
    pub to_currency: String,
    pub ratio: String,
}

/// A -> B -> C -> A cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleOpportunity {
    pub legs: [TriangleLeg; 3],
    pub total_profit_fraction: f64,
    pub safe_volume: u64,
    pub confidence: f64,
}

impl TriangleOpportunity {
    /// Currencies in trading order, starting and ending at the same one
    pub fn path(&self) -> Vec<&str> {
        let mut path: Vec<&str> = self.legs.iter().map(|l| l.from_currency.as_str()).collect();
        path.push(self.legs[0].from_currency.as_str());
        path
    }
}

/// Quote both sides of a pair and earn the spread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketMakingOpportunity {
    pub pair: CurrencyPair,
    pub bid: String,
    pub ask: String,
    pub spread_fraction: f64,
    pub volume: u64,
    pub volatility: f64,
    pub confidence: f64,
}

/// Any opportunity, for callers that pick across strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OpportunityRecord {
    Basic(BasicOpportunity),
    Triangle(TriangleOpportunity),
    MarketMaking(MarketMakingOpportunity),
}

impl OpportunityRecord {
    pub fn confidence(&self) -> f64 {
        match self {
            OpportunityRecord::Basic(o) => o.confidence,
            OpportunityRecord::Triangle(o) => o.confidence,
            OpportunityRecord::MarketMaking(o) => o.confidence,
        }
    }

    /// Quantity the executor would trade
    pub fn volume(&self) -> u64 {
        match self {
            OpportunityRecord::Basic(o) => o.volume,
            OpportunityRecord::Triangle(o) => o.safe_volume,
            OpportunityRecord::MarketMaking(o) => o.volume,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OpportunityRecord::Basic(o) => o.strategy.label(),
            OpportunityRecord::Triangle(_) => "Triangle Arbitrage",
            OpportunityRecord::MarketMaking(_) => "Market Making",
        }
    }
}

/// Result of one analysis pass. Each list keeps its own strategy ordering;
/// nothing is ranked across lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpportunitySet {
    pub basic: Vec<BasicOpportunity>,
    pub triangle: Vec<TriangleOpportunity>,
    pub market_making: Vec<MarketMakingOpportunity>,
}

impl OpportunitySet {
    pub fn is_empty(&self) -> bool {
        self.basic.is_empty() && self.triangle.is_empty() && self.market_making.is_empty()
    }

    pub fn len(&self) -> usize {
        self.basic.len() + self.triangle.len() + self.market_making.len()
    }

    /// All records in list order: basic, triangle, market making
    pub fn records(&self) -> impl Iterator<Item = OpportunityRecord> + '_ {
        self.basic
            .iter()
            .cloned()
            .map(OpportunityRecord::Basic)
            .chain(self.triangle.iter().cloned().map(OpportunityRecord::Triangle))
            .chain(self.market_making.iter().cloned().map(OpportunityRecord::MarketMaking))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(from: &str, to: &str) -> TriangleLeg {
        TriangleLeg {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            ratio: "1:1".to_string(),
        }
    }

    #[test]
    fn test_basic_strategy_serializes_as_label() {
        let json = serde_json::to_string(&BasicStrategy::SpreadTrading).unwrap();
        assert_eq!(json, "\"Spread Trading\"");
        assert_eq!(BasicStrategy::IntegerArbitrage.to_string(), "Integer Arbitrage");
    }

    #[test]
    fn test_triangle_path() {
        let opp = TriangleOpportunity {
            legs: [leg("divine", "exalted"), leg("exalted", "chaos"), leg("chaos", "divine")],
            total_profit_fraction: 0.2,
            safe_volume: 10,
            confidence: 0.6,
        };
        assert_eq!(opp.path(), vec!["divine", "exalted", "chaos", "divine"]);

        let record = OpportunityRecord::Triangle(opp);
        assert_eq!(record.volume(), 10);
        assert_eq!(record.label(), "Triangle Arbitrage");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "triangle");
    }

    #[test]
    fn test_set_records_order() {
        let set = OpportunitySet {
            basic: vec![BasicOpportunity {
                strategy: BasicStrategy::IntegerArbitrage,
                buy_currency: "chaos".to_string(),
                sell_currency: "divine".to_string(),
                buy_ratio: "3:1".to_string(),
                sell_ratio: "3.5:1".to_string(),
                profit_fraction: 0.16,
                volume: 100,
                confidence: 0.33,
            }],
            triangle: vec![],
            market_making: vec![MarketMakingOpportunity {
                pair: CurrencyPair::new("divine", "chaos"),
                bid: "100:1".to_string(),
                ask: "110:1".to_string(),
                spread_fraction: 0.1,
                volume: 800,
                volatility: 0.01,
                confidence: 0.76,
            }],
        };

        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        let labels: Vec<_> = set.records().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["Integer Arbitrage", "Market Making"]);
        assert!(OpportunitySet::default().is_empty());
    }
}
