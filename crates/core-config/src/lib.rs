//! Configuration loading and parsing.
//!
//! Parses `boardmark.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [listener]
//! grace_period_ms = 5000
//!
//! [styles]
//! inline = ["bold", "italic", "strikethrough", "heading-delimiter",
//!           "ul-delimiter", "ol-delimiter", "quote", "inline-code"]
//! block_types = ["code-block", "heading"]
//!
//! [log]
//! filter = "info"
//! ```
//!
//! Every field is optional and defaults to the values above. Strategy lists
//! select *and order* the enabled variants; an unknown strategy name makes
//! the file unparsable, which (like any parse error) falls back to defaults
//! so a typo never leaves the editor without styling. Duplicate entries are
//! dropped by `normalize`, keeping the first occurrence.

use anyhow::Result;
use core_markdown::{BlockTypeStrategy, StyleStrategy};
use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "boardmark.toml";

/// Upper bound for the disconnect grace period.
pub const GRACE_PERIOD_MAX_MS: u64 = 600_000;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    #[serde(default = "ListenerConfig::default_grace_period_ms")]
    pub grace_period_ms: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: Self::default_grace_period_ms(),
        }
    }
}

impl ListenerConfig {
    const fn default_grace_period_ms() -> u64 {
        5000
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StylesConfig {
    #[serde(default = "StylesConfig::default_inline")]
    pub inline: Vec<StyleStrategy>,
    #[serde(default = "StylesConfig::default_block_types")]
    pub block_types: Vec<BlockTypeStrategy>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            inline: Self::default_inline(),
            block_types: Self::default_block_types(),
        }
    }
}

impl StylesConfig {
    fn default_inline() -> Vec<StyleStrategy> {
        StyleStrategy::DEFAULT_ORDER.to_vec()
    }
    fn default_block_types() -> Vec<BlockTypeStrategy> {
        BlockTypeStrategy::DEFAULT_ORDER.to_vec()
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
        }
    }
}

impl LogConfig {
    fn default_filter() -> String {
        "info".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub listener: ListenerConfig,
    #[serde(default)]
    pub styles: StylesConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path: working directory first, then the platform
/// config dir (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("boardmark").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let mut cfg = Config {
                raw: Some(content),
                file,
            };
            cfg.normalize();
            Ok(cfg)
        }
        Err(err) => {
            warn!(target: "config", path = %path.display(), error = %err, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Drop duplicate strategies and clamp the grace period. Returns true
    /// when anything was adjusted.
    pub fn normalize(&mut self) -> bool {
        let mut adjusted = false;

        let raw = self.file.listener.grace_period_ms;
        let clamped = raw.min(GRACE_PERIOD_MAX_MS);
        if clamped != raw {
            info!(target: "config", raw, clamped, max = GRACE_PERIOD_MAX_MS, "grace_period_clamped");
            self.file.listener.grace_period_ms = clamped;
            adjusted = true;
        }

        let before = self.file.styles.inline.len();
        dedup_in_order(&mut self.file.styles.inline);
        let before_block = self.file.styles.block_types.len();
        dedup_in_order(&mut self.file.styles.block_types);
        let dropped = (before - self.file.styles.inline.len())
            + (before_block - self.file.styles.block_types.len());
        if dropped > 0 {
            info!(target: "config", dropped, "duplicate_strategies_dropped");
            adjusted = true;
        }
        adjusted
    }

    pub fn grace_period(&self) -> Duration {
        self.file.listener.grace_period()
    }

    pub fn inline_strategies(&self) -> &[StyleStrategy] {
        &self.file.styles.inline
    }

    pub fn block_type_strategies(&self) -> &[BlockTypeStrategy] {
        &self.file.styles.block_types
    }
}

fn dedup_in_order<T: PartialEq + Copy>(items: &mut Vec<T>) {
    let mut seen: Vec<T> = Vec::with_capacity(items.len());
    items.retain(|item| {
        if seen.contains(item) {
            false
        } else {
            seen.push(*item);
            true
        }
    });
}
