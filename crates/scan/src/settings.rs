//! Layered engine configuration: defaults, optional file, environment

use std::path::Path;

use anyhow::Context;
use config::{Config, Environment, File};

use market_core::EngineConfig;

pub const ENV_PREFIX: &str = "MARKET_SCAN";

/// Load and validate engine settings. A missing file is not an error.
pub fn load_engine_config(path: &Path) -> anyhow::Result<EngineConfig> {
    let settings = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()
        .with_context(|| format!("failed to read configuration from {}", path.display()))?;

    let engine: EngineConfig = settings
        .try_deserialize()
        .context("invalid engine configuration")?;
    engine.validate()?;

    Ok(engine)
}
