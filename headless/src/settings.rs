use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use snake3d_core::{GameConfig, SessionConfig, TickPeriod};

/// Optional settings file; every field may be left out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub rows: Option<u8>,
    pub cols: Option<u8>,
    pub initial_length: Option<u8>,
    pub seed: Option<u64>,
    pub period_ms: Option<u32>,
}

impl FileSettings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read settings from {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Values given on the command line, they win over the file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overrides {
    pub rows: Option<u8>,
    pub cols: Option<u8>,
    pub initial_length: Option<u8>,
    pub seed: Option<u64>,
    pub period_ms: Option<u32>,
}

pub fn resolve(file: &FileSettings, overrides: &Overrides, fallback_seed: u64) -> SessionConfig {
    let defaults = GameConfig::default();
    let rows = overrides.rows.or(file.rows).unwrap_or(defaults.size.0);
    let cols = overrides.cols.or(file.cols).unwrap_or(defaults.size.1);
    let initial_length = overrides
        .initial_length
        .or(file.initial_length)
        .unwrap_or(defaults.initial_length);
    let seed = overrides.seed.or(file.seed).unwrap_or(fallback_seed);
    let tick_period = overrides
        .period_ms
        .or(file.period_ms)
        .map_or_else(TickPeriod::default, TickPeriod::from_millis);

    SessionConfig {
        game: GameConfig::new((rows, cols), initial_length, seed),
        tick_period,
    }
}
