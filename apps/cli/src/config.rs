// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion settings from environment variables and flags.

use xkt_lite_core::ModelConfig;
use xkt_lite_format::WriterConfig;

/// Settings for one conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub model: ModelConfig,
    pub writer: WriterConfig,
}

impl Config {
    /// Load configuration from `XKT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup. Unset or unparsable
    /// values keep their defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        Self {
            model: ModelConfig {
                edge_threshold_degrees: var("XKT_EDGE_THRESHOLD")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.model.edge_threshold_degrees),
                min_tile_diagonal: var("XKT_MIN_TILE_DIAG")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.model.min_tile_diagonal),
            },
            writer: WriterConfig {
                compression_level: var("XKT_COMPRESSION_LEVEL")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.writer.compression_level),
            },
        }
    }

    /// Apply command-line overrides on top.
    pub fn with_overrides(
        mut self,
        edge_threshold: Option<f64>,
        min_tile_diag: Option<f64>,
        compression: Option<u32>,
    ) -> Self {
        if let Some(v) = edge_threshold {
            self.model.edge_threshold_degrees = v;
        }
        if let Some(v) = min_tile_diag {
            self.model.min_tile_diagonal = v;
        }
        if let Some(v) = compression {
            self.writer.compression_level = v;
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.model.validate()?;
        self.writer.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_values_and_fallbacks() {
        let config = Config::from_vars(|key| match key {
            "XKT_MIN_TILE_DIAG" => Some("250".into()),
            "XKT_COMPRESSION_LEVEL" => Some("fast".into()),
            _ => None,
        });
        assert_eq!(config.model.min_tile_diagonal, 250.0);
        assert_eq!(config.model.edge_threshold_degrees, 10.0);
        assert_eq!(config.writer.compression_level, 6);
    }

    #[test]
    fn test_flags_override_env() {
        let config = Config::from_vars(|key| (key == "XKT_EDGE_THRESHOLD").then(|| "20".into()))
            .with_overrides(Some(45.0), None, Some(9));
        assert_eq!(config.model.edge_threshold_degrees, 45.0);
        assert_eq!(config.writer.compression_level, 9);
        assert!(config.validate().is_ok());

        let config = Config::default().with_overrides(None, Some(-1.0), None);
        assert!(config.validate().is_err());
    }
}
