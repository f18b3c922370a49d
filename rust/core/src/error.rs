// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model construction.

use thiserror::Error;

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the document model.
///
/// These are precondition violations. Soft failures such as a missing
/// primitive reference are recorded as [`crate::Diagnostic`]s instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A required creation parameter was not supplied.
    #[error("{operation}: parameter expected: {name}")]
    MissingParameter {
        operation: &'static str,
        name: &'static str,
    },

    /// A primitive with this id already exists.
    #[error("duplicate primitive id: {0}")]
    DuplicatePrimitive(u32),

    /// An entity with this id already exists.
    #[error("duplicate entity id: {0:?}")]
    DuplicateEntity(String),

    /// An entity references both shared and exclusively owned primitives.
    #[error("entity {entity_id:?} mixes reused and non-reused primitives")]
    MixedPrimitiveReuse { entity_id: String },

    /// Configuration values out of range.
    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),

    /// Invalid geometry buffers.
    #[error("geometry error: {0}")]
    Geometry(#[from] xkt_lite_geometry::Error),
}
