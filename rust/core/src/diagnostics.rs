// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Non-fatal events recorded while building a model.
//!
//! Embedding code can inspect [`crate::XktModel::diagnostics`] and decide
//! whether any of these should abort a conversion.

use std::fmt;

/// A soft failure that did not stop the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An entity referenced a primitive id that does not exist; the
    /// reference was skipped.
    PrimitiveNotFound { entity_id: String, primitive_id: u32 },

    /// A mutating call arrived after `finalize`; it was ignored.
    AlreadyFinalized { operation: &'static str },

    /// A primitive was never instanced by any entity. It is quantized
    /// against its own bounds so its buffers stay consistent.
    UnusedPrimitive { primitive_id: u32 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::PrimitiveNotFound {
                entity_id,
                primitive_id,
            } => write!(
                f,
                "entity {:?}: primitive {} not found, skipping",
                entity_id, primitive_id
            ),
            Diagnostic::AlreadyFinalized { operation } => {
                write!(f, "{}: model already finalized", operation)
            }
            Diagnostic::UnusedPrimitive { primitive_id } => {
                write!(f, "primitive {} is not used by any entity", primitive_id)
            }
        }
    }
}
