// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model configuration.

use serde::{Deserialize, Serialize};
use xkt_lite_geometry::DEFAULT_EDGE_THRESHOLD_DEGREES;

use crate::error::{Error, Result};

/// KD-tree nodes whose diagonal is below this stop subdividing (model units).
pub const MIN_TILE_DIAG: f64 = 10_000.0;

/// Tunables for primitive creation and tiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelConfig {
    /// Minimum dihedral angle, in degrees, for an interior edge to be kept.
    pub edge_threshold_degrees: f64,
    /// Diagonal length below which a KD-tree node becomes a leaf.
    pub min_tile_diagonal: f64,
}

impl ModelConfig {
    /// Check that every value is finite and in range.
    pub fn validate(&self) -> Result<()> {
        if !self.edge_threshold_degrees.is_finite()
            || !(0.0..=180.0).contains(&self.edge_threshold_degrees)
        {
            return Err(Error::InvalidConfig(format!(
                "edge threshold must be within 0..=180 degrees, got {}",
                self.edge_threshold_degrees
            )));
        }
        if !self.min_tile_diagonal.is_finite() || self.min_tile_diagonal <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "minimum tile diagonal must be positive, got {}",
                self.min_tile_diagonal
            )));
        }
        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            edge_threshold_degrees: DEFAULT_EDGE_THRESHOLD_DEGREES,
            min_tile_diagonal: MIN_TILE_DIAG,
        }
    }
}
