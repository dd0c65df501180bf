//! Directory polling for `watch` mode

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use market_core::OpportunitySet;
use market_detector::OpportunityEngine;
use market_history::SharedHistory;

use crate::source;

/// Failed reads of one file before it is given up on. Covers files that are
/// still being written when a tick first sees them.
pub const MAX_LOAD_ATTEMPTS: u32 = 5;

/// Outcome of one directory scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub analyzed: usize,
    /// Unreadable this tick, retried on the next one
    pub pending: usize,
    pub abandoned: usize,
}

/// Tracks which snapshot files have already been fed to the engine
#[derive(Debug, Default)]
pub struct Watcher {
    seen: HashSet<PathBuf>,
    failures: HashMap<PathBuf, u32>,
}

impl Watcher {
    /// Files analyzed or abandoned so far
    pub fn seen(&self) -> usize {
        self.seen.len()
    }

    /// Analyze every new snapshot in `dir`, oldest name first.
    ///
    /// A file is only marked seen once it parses, or once it has failed
    /// [`MAX_LOAD_ATTEMPTS`] times.
    pub fn tick<F>(
        &mut self,
        engine: &OpportunityEngine,
        dir: &Path,
        history: &SharedHistory,
        mut on_analyzed: F,
    ) -> anyhow::Result<TickSummary>
    where
        F: FnMut(&Path, &OpportunitySet),
    {
        let mut summary = TickSummary::default();

        for path in source::snapshot_files(dir)? {
            if self.seen.contains(&path) {
                continue;
            }

            match source::load_snapshot(&path) {
                Ok(snapshot) => {
                    self.failures.remove(&path);
                    let opportunities = engine.analyze_shared(&snapshot, history);
                    on_analyzed(&path, &opportunities);
                    self.seen.insert(path);
                    summary.analyzed += 1;
                }
                Err(e) => {
                    let attempts = self.failures.entry(path.clone()).or_insert(0);
                    *attempts += 1;

                    if *attempts >= MAX_LOAD_ATTEMPTS {
                        warn!("Giving up on {} after {} attempts: {:#}", path.display(), attempts, e);
                        self.failures.remove(&path);
                        self.seen.insert(path);
                        summary.abandoned += 1;
                    } else {
                        debug!(attempt = *attempts, "Retrying {} next tick: {:#}", path.display(), e);
                        summary.pending += 1;
                    }
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use market_core::EngineConfig;

    const DOCUMENT: &str = r#"{
        "i_want": "divine",
        "i_have": "chaos",
        "market_ratio": "274:1",
        "available_trades": [{"ratio": "275:1", "stock": 12}],
        "competing_trades": []
    }"#;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("market-watch-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn setup() -> (OpportunityEngine, SharedHistory) {
        let engine = OpportunityEngine::new(EngineConfig::default()).unwrap();
        let history = SharedHistory::from_config(engine.config());
        (engine, history)
    }

    #[test]
    fn test_partially_written_file_is_retried() {
        let dir = scratch_dir("partial");
        let path = dir.join("20250114_120000_market.json");
        let (engine, history) = setup();
        let mut watcher = Watcher::default();
        let mut analyzed = Vec::new();

        fs::write(&path, r#"{"i_want":"#).unwrap();
        let first = watcher
            .tick(&engine, &dir, &history, |p, _| analyzed.push(p.to_path_buf()))
            .unwrap();

        fs::write(&path, DOCUMENT).unwrap();
        let second = watcher
            .tick(&engine, &dir, &history, |p, _| analyzed.push(p.to_path_buf()))
            .unwrap();
        let third = watcher.tick(&engine, &dir, &history, |_, _| {}).unwrap();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(first, TickSummary { analyzed: 0, pending: 1, abandoned: 0 });
        assert_eq!(second, TickSummary { analyzed: 1, pending: 0, abandoned: 0 });
        assert_eq!(third, TickSummary::default());
        assert_eq!(analyzed, vec![path]);
        assert_eq!(watcher.seen(), 1);
        assert_eq!(history.stats().entry_count, 1);
    }

    #[test]
    fn test_broken_file_is_abandoned() {
        let dir = scratch_dir("broken");
        fs::write(dir.join("20250114_120000_market.json"), "{").unwrap();
        let (engine, history) = setup();
        let mut watcher = Watcher::default();

        let mut summaries = Vec::new();
        for _ in 0..MAX_LOAD_ATTEMPTS + 1 {
            summaries.push(watcher.tick(&engine, &dir, &history, |_, _| {}).unwrap());
        }
        fs::remove_dir_all(&dir).ok();

        let pending: usize = summaries.iter().map(|s| s.pending).sum();
        let abandoned: usize = summaries.iter().map(|s| s.abandoned).sum();
        assert_eq!(pending, (MAX_LOAD_ATTEMPTS - 1) as usize);
        assert_eq!(abandoned, 1);
        assert_eq!(summaries.last(), Some(&TickSummary::default()));
        assert_eq!(watcher.seen(), 1);
        assert_eq!(history.stats().record_count, 0);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let (engine, history) = setup();
        let mut watcher = Watcher::default();
        let dir = std::env::temp_dir().join("market-watch-does-not-exist");
        assert!(watcher.tick(&engine, &dir, &history, |_, _| {}).is_err());
    }
}
