mod types;

pub use types::*;

use anyhow::{Context, Result};
use ofsextract_mvc::ofmd::{DEPTH_OFFSET, OFMD_MARKER, SEI_MARKER};
use ofsextract_mvc::{DecoderConfig, ScanStrategy, ScannerConfig, SourceKind};
use std::path::Path;
use std::time::Duration;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./ofsextract.toml", "~/.config/ofsextract/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let scanner = &config.scanner;
    if scanner.buffer_size < SEI_MARKER.len() {
        anyhow::bail!(
            "scanner.buffer_size must be at least {} bytes",
            SEI_MARKER.len()
        );
    }
    if scanner.max_buffer_size < scanner.buffer_size {
        anyhow::bail!(
            "scanner.max_buffer_size ({}) is smaller than scanner.buffer_size ({})",
            scanner.max_buffer_size,
            scanner.buffer_size
        );
    }

    let extract = &config.extract;
    if extract.store_size < DEPTH_OFFSET {
        anyhow::bail!("extract.store_size must be at least {} bytes", DEPTH_OFFSET);
    }
    let min_lookahead = SEI_MARKER.len() + OFMD_MARKER.len();
    if extract.lookahead < min_lookahead {
        anyhow::bail!("extract.lookahead must be at least {} bytes", min_lookahead);
    }
    for (name, size) in [
        ("extract.store_size", extract.store_size),
        ("extract.lookahead", extract.lookahead),
    ] {
        if size > scanner.max_buffer_size {
            anyhow::bail!(
                "{} ({}) exceeds scanner.max_buffer_size ({})",
                name,
                size,
                scanner.max_buffer_size
            );
        }
    }

    Ok(())
}

fn timeout_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl Config {
    /// Scanner settings for a given input.
    ///
    /// Standard input gets the stream timeout and is always scanned with a
    /// sliding window, since a pipe cannot be rewound.
    pub fn scanner_config(&self, source: &SourceKind) -> ScannerConfig {
        let settings = &self.scanner;
        let is_file = matches!(source, SourceKind::File(_));

        let mut strategy = ScanStrategy::from(settings.strategy);
        if strategy == ScanStrategy::BoundedGrowth && !is_file {
            tracing::warn!("growth strategy needs a regular file, using sliding window");
            strategy = ScanStrategy::SlidingWindow;
        }

        let timeout = if is_file {
            timeout_secs(settings.file_timeout_secs)
        } else {
            timeout_secs(settings.stream_timeout_secs)
        };

        ScannerConfig::default()
            .buffer_size(settings.buffer_size)
            .max_buffer_size(settings.max_buffer_size)
            .strategy(strategy)
            .timeout(timeout)
    }

    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            store_size: self.extract.store_size,
            lookahead: self.extract.lookahead,
            ofmd_timeout: timeout_secs(self.scanner.ofmd_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.scanner.buffer_size, 128 * 1024);
        assert_eq!(config.extract.store_size, 4096);
        assert_eq!(config.extract.lookahead, 200);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [scanner]
            strategy = "growth"
            buffer_size = 4096
            "#,
        )
        .unwrap();

        assert_eq!(config.scanner.strategy, StrategyName::Growth);
        assert_eq!(config.scanner.buffer_size, 4096);
        assert_eq!(config.scanner.stream_timeout_secs, 10);
        assert_eq!(config.extract, ExtractSettings::default());
    }

    #[test]
    fn test_growth_downgraded_for_stdin() {
        let mut config = Config::default();
        config.scanner.strategy = StrategyName::Growth;

        let stdin = config.scanner_config(&SourceKind::Stdin);
        assert_eq!(stdin.strategy, ScanStrategy::SlidingWindow);
        assert_eq!(stdin.timeout, Some(Duration::from_secs(10)));

        let file = config.scanner_config(&SourceKind::File(PathBuf::from("a.mvc")));
        assert_eq!(file.strategy, ScanStrategy::BoundedGrowth);
        assert_eq!(file.timeout, None);
    }

    #[test]
    fn test_rejects_small_values() {
        let mut config = Config::default();
        config.scanner.buffer_size = 3;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.scanner.max_buffer_size = 10;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.extract.store_size = 13;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.extract.lookahead = 7;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_capture_sizes_bounded_by_memory_cap() {
        let mut config = Config::default();
        config.scanner.buffer_size = 1024;
        config.scanner.max_buffer_size = 8192;
        assert!(validate_config(&config).is_ok());

        config.extract.store_size = 16384;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("extract.store_size"));

        config.extract.store_size = 8192;
        config.extract.lookahead = 9000;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_ofmd_timeout_zero_disables() {
        let mut config = Config::default();
        assert_eq!(config.decoder_config().ofmd_timeout, None);
        config.scanner.ofmd_timeout_secs = 30;
        assert_eq!(
            config.decoder_config().ofmd_timeout,
            Some(Duration::from_secs(30))
        );
    }
}
