// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Writer configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// zlib level used when none is configured (flate2's default).
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WriterConfig {
    /// zlib compression level, 0 (store) to 9 (best).
    pub compression_level: u32,
}

impl WriterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.compression_level > 9 {
            return Err(Error::InvalidConfig(format!(
                "compression level must be 0-9, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}
