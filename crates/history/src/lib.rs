//! Per-pair market history and volatility
//!
//! Features:
//! - Trailing time window with eager eviction
//! - Directed pair keys, currencies remembered for triangle search
//! - Coefficient-of-variation volatility
//! - Single-lock shared wrapper for concurrent scanners

pub mod shared;
pub mod store;
pub mod volatility;

pub use shared::SharedHistory;
pub use store::{HistoryEntry, HistoryStats, HistoryStore};
pub use volatility::{coefficient_of_variation, volatility};
