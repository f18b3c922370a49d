// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # XKT-Lite Format
//!
//! Binary packing for finalized [`xkt_lite_core::XktModel`]s in the XKT v6
//! layout read by xeokit.
//!
//! - [`write_xkt`] flattens a model into sixteen typed arrays, compresses
//!   each one with zlib (in parallel) and prefixes a `u32` size header.
//! - [`read_xkt`] reverses that into [`XktData`].
//! - [`validate`] reads a buffer back and compares it with the model.
//!
//! ```rust,ignore
//! let bytes = write_xkt(&model, &WriterConfig::default())?;
//! assert!(validate_xkt(&bytes, &model));
//! ```

pub mod codec;
pub mod config;
pub mod data;
pub mod error;
pub mod layout;
pub mod reader;
pub mod validator;
pub mod writer;

pub use codec::{Codec, ZlibCodec};
pub use config::{WriterConfig, DEFAULT_COMPRESSION_LEVEL};
pub use data::{escape_non_ascii, portion_range, XktData};
pub use error::{Error, Result};
pub use layout::{Element, NUM_ELEMENTS, XKT_VERSION};
pub use reader::{read_header, read_xkt, read_xkt_with, XktHeader};
pub use validator::{validate, validate_data, validate_xkt, ValidationFailure, ValidationReport};
pub use writer::{write_xkt, XktWriter};
