//! Configuration types

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Opportunity engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum profit fraction for integer-ratio and triangle arbitrage
    pub min_profit_threshold: f64,
    pub max_trade_volume: u64,
    /// Trailing window of per-pair history
    pub history_window_secs: u64,
    /// History entries a pair needs before it is scored for market making
    pub mm_min_history: usize,
    pub mm_confidence_cutoff: f64,
    /// Minimum first-quote spread for spread arbitrage
    pub spread_threshold: f64,
    /// Volume suggested for integer-ratio trades
    pub conservative_volume: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_profit_threshold: 0.015,  // 1.5%
            max_trade_volume: 1000,
            history_window_secs: 30 * 60,
            mm_min_history: 5,
            mm_confidence_cutoff: 0.5,
            spread_threshold: 0.05,
            conservative_volume: 100,
        }
    }
}

impl EngineConfig {
    /// Reject values that would corrupt scoring
    pub fn validate(&self) -> CoreResult<()> {
        if !self.min_profit_threshold.is_finite() || self.min_profit_threshold < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "min_profit_threshold must be a non-negative number, got {}",
                self.min_profit_threshold
            )));
        }
        if self.max_trade_volume == 0 {
            return Err(CoreError::InvalidConfig(
                "max_trade_volume must be greater than zero".to_string(),
            ));
        }
        if self.history_window_secs == 0 || self.try_history_window().is_none() {
            return Err(CoreError::InvalidConfig(format!(
                "history_window_secs out of range: {}",
                self.history_window_secs
            )));
        }
        if self.mm_min_history == 0 {
            return Err(CoreError::InvalidConfig(
                "mm_min_history must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mm_confidence_cutoff) {
            return Err(CoreError::InvalidConfig(format!(
                "mm_confidence_cutoff must be within [0, 1], got {}",
                self.mm_confidence_cutoff
            )));
        }
        if !self.spread_threshold.is_finite() || self.spread_threshold < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "spread_threshold must be a non-negative number, got {}",
                self.spread_threshold
            )));
        }
        if self.conservative_volume == 0 {
            return Err(CoreError::InvalidConfig(
                "conservative_volume must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// History window as a time delta. Validated configs never hit the fallback.
    pub fn history_window(&self) -> TimeDelta {
        self.try_history_window().unwrap_or(TimeDelta::MAX)
    }

    fn try_history_window(&self) -> Option<TimeDelta> {
        i64::try_from(self.history_window_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history_window(), TimeDelta::minutes(30));
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            EngineConfig { min_profit_threshold: -0.1, ..Default::default() },
            EngineConfig { min_profit_threshold: f64::NAN, ..Default::default() },
            EngineConfig { max_trade_volume: 0, ..Default::default() },
            EngineConfig { history_window_secs: 0, ..Default::default() },
            EngineConfig { history_window_secs: u64::MAX, ..Default::default() },
            EngineConfig { mm_min_history: 0, ..Default::default() },
            EngineConfig { mm_confidence_cutoff: 1.5, ..Default::default() },
            EngineConfig { spread_threshold: f64::INFINITY, ..Default::default() },
            EngineConfig { conservative_volume: 0, ..Default::default() },
        ];

        for config in cases {
            assert!(
                matches!(config.validate(), Err(CoreError::InvalidConfig(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"min_profit_threshold": 0.02}"#).unwrap();
        assert_eq!(config.min_profit_threshold, 0.02);
        assert_eq!(config.max_trade_volume, 1000);
        assert_eq!(config.mm_min_history, 5);
    }
}
