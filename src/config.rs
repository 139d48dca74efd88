use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::display::DisplayOptions;

fn empty_path_none<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<PathBuf>::deserialize(deserializer)?;
    Ok(opt.and_then(|path| {
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    }))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// File of hex-encoded IP datagrams, one per line. Stdin when unset.
    #[serde(deserialize_with = "empty_path_none")]
    pub path: Option<PathBuf>,
    /// Stop after this many datagrams (0 = unlimited).
    pub count: u64,
    /// Cut every datagram to this many bytes before decoding (0 = off).
    pub snaplen: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub quiet: bool,
    pub verbose: u8,
    pub hex_dump: bool,
}

impl OutputConfig {
    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert!(config.input.path.is_none());
        assert_eq!(config.input.count, 0);
        assert_eq!(config.input.snaplen, 0);
        assert!(!config.output.quiet);
        assert_eq!(config.output.verbose, 0);
    }

    #[test]
    fn sections_override_defaults() {
        let raw = r#"
            [input]
            path = ""
            count = 10
            snaplen = 64

            [output]
            verbose = 2
            hex_dump = true
        "#;
        let config = Config::from_toml(raw).unwrap();
        assert!(config.input.path.is_none());
        assert_eq!(config.input.count, 10);
        assert_eq!(config.input.snaplen, 64);
        assert_eq!(
            config.output.display_options(),
            DisplayOptions {
                quiet: false,
                verbose: 2
            }
        );
        assert!(config.output.hex_dump);
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        assert!(matches!(
            Config::from_toml("[output]\nverbose = \"lots\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
