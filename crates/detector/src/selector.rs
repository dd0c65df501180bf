//! Picking a single opportunity across strategy lists

use serde::{Deserialize, Serialize};

use market_core::{OpportunityRecord, OpportunitySet};

/// Gate applied before handing an opportunity to an executor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionCriteria {
    pub min_confidence: f64,
    pub min_volume: u64,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            min_confidence: 0.7,
            min_volume: 0,
        }
    }
}

impl SelectionCriteria {
    pub fn accepts(&self, record: &OpportunityRecord) -> bool {
        record.confidence() >= self.min_confidence && record.volume() >= self.min_volume
    }
}

/// Highest-confidence record meeting `criteria`. Ties go to the earlier
/// record in basic, triangle, market-making order.
pub fn select_best(set: &OpportunitySet, criteria: &SelectionCriteria) -> Option<OpportunityRecord> {
    set.records()
        .filter(|record| criteria.accepts(record))
        .fold(None, |best: Option<OpportunityRecord>, record| match best {
            Some(current) if current.confidence() >= record.confidence() => Some(current),
            _ => Some(record),
        })
}
