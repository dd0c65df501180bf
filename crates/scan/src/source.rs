//! Snapshot documents on disk

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;

use market_core::{timestamp_from_stem, MarketSnapshot};

/// Read one snapshot document. Capture time comes from the document, then the
/// file name, then the clock.
pub fn load_snapshot(path: &Path) -> anyhow::Result<MarketSnapshot> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let fallback = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(timestamp_from_stem)
        .unwrap_or_else(Utc::now);

    MarketSnapshot::from_json(&json, fallback)
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// `*.json` files in `dir`, sorted by name (archive names sort by time)
pub fn snapshot_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
