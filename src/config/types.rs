use ofsextract_mvc::ofmd::{DEFAULT_LOOKAHEAD, DEFAULT_STORE_SIZE};
use ofsextract_mvc::scanner::{DEFAULT_BUFFER_SIZE, DEFAULT_MAX_BUFFER_SIZE};
use ofsextract_mvc::ScanStrategy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub scanner: ScannerSettings,

    #[serde(default)]
    pub extract: ExtractSettings,
}

/// How the stream is buffered while searching for markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyName {
    /// Fixed window that slides forward; works on pipes.
    #[default]
    Sliding,
    /// Growing buffer capped at `max_buffer_size`; files only.
    Growth,
}

impl From<StrategyName> for ScanStrategy {
    fn from(name: StrategyName) -> Self {
        match name {
            StrategyName::Sliding => ScanStrategy::SlidingWindow,
            StrategyName::Growth => ScanStrategy::BoundedGrowth,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScannerSettings {
    /// Bytes per read window, also the growth increment
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Upper bound for the growth strategy
    #[serde(default = "default_max_buffer_size")]
    pub max_buffer_size: usize,

    #[serde(default)]
    pub strategy: StrategyName,

    /// Pattern-not-found guard for standard input (0 disables)
    #[serde(default = "default_stream_timeout")]
    pub stream_timeout_secs: u64,

    /// Pattern-not-found guard for regular files (0 disables)
    #[serde(default)]
    pub file_timeout_secs: u64,

    /// Give up when no OFMD record turns up within this many seconds (0 disables)
    #[serde(default)]
    pub ofmd_timeout_secs: u64,
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_max_buffer_size() -> usize {
    DEFAULT_MAX_BUFFER_SIZE
}

fn default_stream_timeout() -> u64 {
    10
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            max_buffer_size: default_max_buffer_size(),
            strategy: StrategyName::default(),
            stream_timeout_secs: default_stream_timeout(),
            file_timeout_secs: 0,
            ofmd_timeout_secs: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtractSettings {
    /// Bytes captured per OFMD record
    #[serde(default = "default_store_size")]
    pub store_size: usize,

    /// Window after an SEI marker searched for "OFMD"
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,
}

fn default_store_size() -> usize {
    DEFAULT_STORE_SIZE
}

fn default_lookahead() -> usize {
    DEFAULT_LOOKAHEAD
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            store_size: default_store_size(),
            lookahead: default_lookahead(),
        }
    }
}
