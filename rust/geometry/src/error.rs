// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding geometry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid positions: length {0} is not a multiple of 3")]
    InvalidPositions(usize),

    #[error("Invalid normals: length {normals} does not match positions length {positions}")]
    NormalsMismatch { normals: usize, positions: usize },

    #[error("Invalid indices: length {0} is not a multiple of 3")]
    InvalidIndices(usize),

    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}
