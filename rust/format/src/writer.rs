// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XKT v6 writer.
//!
//! Layout: little-endian `u32` header `[version, elementCount, size...]`
//! followed by one compressed blob per element.

use rayon::prelude::*;
use xkt_lite_core::XktModel;

use crate::codec::{Codec, ZlibCodec};
use crate::config::WriterConfig;
use crate::data::XktData;
use crate::error::Result;
use crate::layout::{NUM_ELEMENTS, XKT_VERSION};

/// Packs models into XKT buffers with a given codec.
#[derive(Debug, Clone, Default)]
pub struct XktWriter<C = ZlibCodec> {
    codec: C,
}

impl XktWriter<ZlibCodec> {
    pub fn new(config: &WriterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            codec: ZlibCodec::from_config(config),
        })
    }
}

impl<C: Codec> XktWriter<C> {
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    /// Pack a finalized model.
    pub fn write_model(&self, model: &XktModel) -> Result<Vec<u8>> {
        let data = XktData::from_model(model)?;
        self.write_data(&data)
    }

    /// Pack already flattened arrays.
    pub fn write_data(&self, data: &XktData) -> Result<Vec<u8>> {
        let elements = data.encode_elements()?;

        // Blobs are independent; collect keeps file order
        let blobs: Vec<Vec<u8>> = elements
            .par_iter()
            .map(|element| self.codec.compress(element))
            .collect::<Result<_>>()?;

        let buffer = pack_blobs(&blobs);
        tracing::debug!(
            raw_bytes = elements.iter().map(Vec::len).sum::<usize>(),
            packed_bytes = buffer.len(),
            "packed XKT"
        );
        Ok(buffer)
    }
}

/// Concatenate the header and blobs.
fn pack_blobs(blobs: &[Vec<u8>]) -> Vec<u8> {
    debug_assert_eq!(blobs.len(), NUM_ELEMENTS);
    let header_len = (2 + blobs.len()) * 4;
    let body_len: usize = blobs.iter().map(Vec::len).sum();

    let mut buffer = Vec::with_capacity(header_len + body_len);
    buffer.extend_from_slice(&XKT_VERSION.to_le_bytes());
    buffer.extend_from_slice(&(blobs.len() as u32).to_le_bytes());
    for blob in blobs {
        buffer.extend_from_slice(&(blob.len() as u32).to_le_bytes());
    }
    for blob in blobs {
        buffer.extend_from_slice(blob);
    }
    buffer
}

/// Pack a finalized model with zlib.
pub fn write_xkt(model: &XktModel, config: &WriterConfig) -> Result<Vec<u8>> {
    XktWriter::new(config)?.write_model(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_header_layout() {
        let blobs: Vec<Vec<u8>> = (0..NUM_ELEMENTS).map(|i| vec![i as u8; i]).collect();
        let buffer = pack_blobs(&blobs);

        let word = |i: usize| u32::from_le_bytes([
            buffer[i * 4],
            buffer[i * 4 + 1],
            buffer[i * 4 + 2],
            buffer[i * 4 + 3],
        ]);
        assert_eq!(word(0), 6);
        assert_eq!(word(1), 16);
        assert_eq!(word(2 + 5), 5);
        let header_len = 18 * 4;
        assert_eq!(buffer.len(), header_len + (0..16).sum::<usize>());
        assert_eq!(buffer[header_len], 1);
    }

    #[test]
    fn test_invalid_level() {
        let config = WriterConfig {
            compression_level: 12,
        };
        assert!(matches!(XktWriter::new(&config), Err(Error::InvalidConfig(_))));
    }
}
