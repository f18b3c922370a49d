// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for reading and writing XKT buffers.

use thiserror::Error;

/// Result type alias for format operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("model error: {0}")]
    Model(#[from] xkt_lite_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model must be finalized before writing")]
    NotFinalized,

    #[error("unsupported XKT version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("unexpected element count {found}, expected {expected}")]
    ElementCount { found: u32, expected: u32 },

    #[error("buffer truncated: need {needed} bytes, have {available}")]
    Truncated { needed: u64, available: u64 },

    #[error("element {element}: {len} bytes is not a multiple of {width}")]
    Misaligned {
        element: &'static str,
        len: usize,
        width: usize,
    },

    #[error("invalid writer configuration: {0}")]
    InvalidConfig(String),
}
