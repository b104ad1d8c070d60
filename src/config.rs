#![forbid(unsafe_code)]

//! Program-level settings
//!
//! Settings are optional and can be loaded from a TOML fragment, typically a
//! `[cli]` table embedded in a host's own configuration file:
//!
//! ```toml
//! title = "{name} <command> [flags]"
//! color = "never"
//! help = true
//! version = "1.2.0"
//! ```

use serde::Deserialize;
use termcolor::ColorChoice;
use thiserror::Error;

use crate::output::instruction::DEFAULT_TITLE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// When usage output is colorized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorOption {
    #[default]
    Auto,
    Always,
    Never,
}

impl From<ColorOption> for ColorChoice {
    fn from(option: ColorOption) -> Self {
        match option {
            ColorOption::Auto => ColorChoice::Auto,
            ColorOption::Always => ColorChoice::Always,
            ColorOption::Never => ColorChoice::Never,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Usage title template; `{name}` expands to the program name
    pub title: String,
    pub color: ColorOption,
    /// Register the built-in `help` command
    pub help: bool,
    /// Register the built-in `version` command reporting this version
    pub version: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            title: DEFAULT_TITLE.to_string(),
            color: ColorOption::Auto,
            help: false,
            version: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml_str(
            r#"
title = "{name} <command>"
color = "never"
help = true
version = "1.2.0"
"#,
        )
        .unwrap();

        assert_eq!(config.title, "{name} <command>");
        assert_eq!(config.color, ColorOption::Never);
        assert!(config.help);
        assert_eq!(config.version.as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_color_option_mapping() {
        assert_eq!(ColorChoice::from(ColorOption::Always), ColorChoice::Always);
        assert_eq!(ColorChoice::from(ColorOption::Never), ColorChoice::Never);
        assert_eq!(ColorChoice::from(ColorOption::Auto), ColorChoice::Auto);
    }

    #[test]
    fn test_rejects_unknown_keys_and_values() {
        assert!(Config::from_toml_str("colour = \"never\"").is_err());
        assert!(Config::from_toml_str("color = \"sometimes\"").is_err());
    }
}
