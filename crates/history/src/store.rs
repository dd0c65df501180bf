//! Time-windowed per-pair market history

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

use market_core::{CurrencyPair, EngineConfig, MarketSnapshot};

use crate::volatility;

/// One recorded observation of a pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub pair: CurrencyPair,
    pub observed_at: DateTime<Utc>,
    /// Parsed ratio of the first available quote, `0.0` if unusable
    pub best_rate: f64,
    /// Stock of the first available quote
    pub volume: u64,
}

impl HistoryEntry {
    pub fn from_snapshot(pair: CurrencyPair, snapshot: &MarketSnapshot) -> Self {
        // First listed quote, not the cheapest: the freshest primary quote
        let (best_rate, volume) = snapshot
            .available_quotes
            .first()
            .map(|q| (q.rate(), q.stock))
            .unwrap_or((0.0, 0));

        Self {
            pair,
            observed_at: snapshot.captured_at,
            best_rate,
            volume,
        }
    }

    pub fn has_rate(&self) -> bool {
        self.best_rate > 0.0
    }
}

/// Recent snapshots keyed by directed pair, newest last.
///
/// Keys live for the lifetime of the store; a pair whose entries all aged out
/// keeps an empty sequence. Currencies are never forgotten.
///
/// The window is measured from the newest time the store has seen, so a late
/// snapshot can never pull stale entries back into view.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    window: TimeDelta,
    entries: BTreeMap<CurrencyPair, Vec<HistoryEntry>>,
    known_currencies: BTreeSet<String>,
    /// Newest capture or eviction time seen so far
    high_water: Option<DateTime<Utc>>,
    record_count: u64,
    evicted_count: u64,
    rejected_count: u64,
}

impl HistoryStore {
    pub fn new(window: TimeDelta) -> Self {
        Self {
            window,
            entries: BTreeMap::new(),
            known_currencies: BTreeSet::new(),
            high_water: None,
            record_count: 0,
            evicted_count: 0,
            rejected_count: 0,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.history_window())
    }

    pub fn window(&self) -> TimeDelta {
        self.window
    }

    /// Record a snapshot under `pair`, then evict everything older than the
    /// window relative to the newest time seen so far.
    ///
    /// A late snapshot already outside that window registers its pair and
    /// currencies but is not stored.
    pub fn record(&mut self, pair: CurrencyPair, snapshot: &MarketSnapshot) -> HistoryEntry {
        let entry = HistoryEntry::from_snapshot(pair.clone(), snapshot);

        self.known_currencies.insert(pair.base.clone());
        self.known_currencies.insert(pair.quote.clone());
        self.record_count += 1;

        let now = self.advance(entry.observed_at);
        let cutoff = self.cutoff(now);
        let series = self.entries.entry(pair).or_default();

        if entry.observed_at < cutoff {
            debug!(
                pair = %entry.pair,
                observed_at = %entry.observed_at,
                newest = %now,
                "Dropped snapshot older than the history window"
            );
            self.rejected_count += 1;
            return entry;
        }

        // Keep newest-last even if snapshots arrive out of order
        let pos = series.partition_point(|e| e.observed_at <= entry.observed_at);
        series.insert(pos, entry.clone());

        self.evict(now);
        entry
    }

    /// Drop entries strictly older than `now - window` across all pairs.
    ///
    /// The effective `now` never moves backwards.
    pub fn evict(&mut self, now: DateTime<Utc>) {
        let now = self.advance(now);
        let cutoff = self.cutoff(now);
        let mut evicted = 0;

        for series in self.entries.values_mut() {
            let stale = series.partition_point(|e| e.observed_at < cutoff);
            if stale > 0 {
                series.drain(..stale);
                evicted += stale;
            }
        }

        if evicted > 0 {
            trace!(evicted, %cutoff, "Evicted stale history");
            self.evicted_count += evicted as u64;
        }
    }

    /// Entries as of the last record/evict; empty for unknown pairs
    pub fn entries_for(&self, pair: &CurrencyPair) -> &[HistoryEntry] {
        self.entries.get(pair).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entries still inside the window at `now`
    pub fn entries_at(&self, pair: &CurrencyPair, now: DateTime<Utc>) -> &[HistoryEntry] {
        let entries = self.entries_for(pair);
        let cutoff = self.cutoff(now);
        let stale = entries.partition_point(|e| e.observed_at < cutoff);
        &entries[stale..]
    }

    pub fn latest(&self, pair: &CurrencyPair) -> Option<&HistoryEntry> {
        self.entries_for(pair).last()
    }

    /// Most recent entry that carries a usable rate
    pub fn latest_priced(&self, pair: &CurrencyPair) -> Option<&HistoryEntry> {
        self.entries_for(pair).iter().rev().find(|e| e.has_rate())
    }

    /// Every currency ever recorded on either side of a pair
    pub fn known_currencies(&self) -> &BTreeSet<String> {
        &self.known_currencies
    }

    /// Tracked pairs in key order, including ones that aged out entirely
    pub fn pairs(&self) -> impl Iterator<Item = (&CurrencyPair, &[HistoryEntry])> {
        self.entries.iter().map(|(pair, series)| (pair, series.as_slice()))
    }

    /// Coefficient of variation of the pair's recorded rates
    pub fn volatility(&self, pair: &CurrencyPair) -> f64 {
        volatility::volatility(self.entries_for(pair))
    }

    /// Newest capture or eviction time seen so far
    pub fn newest(&self) -> Option<DateTime<Utc>> {
        self.high_water
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            pair_count: self.entries.len(),
            entry_count: self.entries.values().map(Vec::len).sum(),
            currency_count: self.known_currencies.len(),
            record_count: self.record_count,
            evicted_count: self.evicted_count,
            rejected_count: self.rejected_count,
        }
    }

    fn advance(&mut self, at: DateTime<Utc>) -> DateTime<Utc> {
        let now = self.high_water.map_or(at, |hw| hw.max(at));
        self.high_water = Some(now);
        now
    }

    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Statistics about recorded history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub pair_count: usize,
    pub entry_count: usize,
    pub currency_count: usize,
    pub record_count: u64,
    pub evicted_count: u64,
    /// Late snapshots that were already outside the window
    pub rejected_count: u64,
}
