//! Tool configuration.
//!
//! Settings come from an optional TOML file and are overridden by CLI flags:
//!
//! ```toml
//! chip = "atmega328p"
//! image = "build/sketch.eep"
//! format = "intelhex"   # raw | intelhex | snapshot (default: from extension)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eeprom_core::{Chip, ImageFormat};
use serde::{Deserialize, Deserializer};

/// Config file read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "eeprom.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[serde(deserialize_with = "chip_name")]
    pub chip: Chip,
    /// Default image for commands that take one
    pub image: Option<PathBuf>,
    /// Force a format instead of guessing from the extension
    pub format: Option<ImageFormat>,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("cannot parse config toml")
    }

    /// Load `path`, or `eeprom.toml` if present, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = PathBuf::from(DEFAULT_CONFIG);
                if !p.exists() {
                    log::debug!("no {} found, using defaults", DEFAULT_CONFIG);
                    return Ok(Config::default());
                }
                p
            }
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&text)?;
        log::debug!("loaded config {}: {:?}", path.display(), config);
        Ok(config)
    }
}

/// Same spellings as `--chip`: `ATmega328P`, `328p`, `tiny85`, ...
fn chip_name<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Chip, D::Error> {
    let name = String::deserialize(d)?;
    name.parse().map_err(serde::de::Error::custom)
}
