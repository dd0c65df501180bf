//! Opportunity detection engine
//!
//! Features:
//! - Integer-ratio arbitrage
//! - Spread arbitrage between the two sides of a book
//! - Triangle arbitrage across recorded pairs
//! - Market-making scoring from history and the current book
//! - Best-pick selection across strategies

pub mod engine;
pub mod selector;
pub mod strategies;

pub use engine::{EngineStats, OpportunityEngine};
pub use selector::{select_best, SelectionCriteria};
pub use strategies::{
    find_integer_ratio, find_market_making, find_spread, find_triangles, Strategy,
    StrategyContext,
};
