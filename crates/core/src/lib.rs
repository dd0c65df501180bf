//! Core types and utilities for the currency market scanner
//!
//! This crate provides shared types used across all components:
//! - Snapshot and quote definitions
//! - Ratio notation parsing
//! - Opportunity record types
//! - Engine configuration

pub mod types;
pub mod ratio;
pub mod opportunities;
pub mod config;
pub mod errors;

pub use types::*;
pub use ratio::*;
pub use opportunities::*;
pub use config::*;
pub use errors::*;
