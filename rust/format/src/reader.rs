// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XKT v6 reader.

use crate::codec::{Codec, ZlibCodec};
use crate::data::XktData;
use crate::error::{Error, Result};
use crate::layout::{NUM_ELEMENTS, XKT_VERSION};

fn read_u32(bytes: &[u8], word: usize) -> Result<u32> {
    let start = word * 4;
    match bytes.get(start..start + 4) {
        Some(b) => Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        None => Err(Error::Truncated {
            needed: (start + 4) as u64,
            available: bytes.len() as u64,
        }),
    }
}

/// Parsed container header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XktHeader {
    pub version: u32,
    pub element_sizes: Vec<u32>,
}

impl XktHeader {
    /// Header length in bytes.
    pub fn header_len(&self) -> usize {
        (2 + self.element_sizes.len()) * 4
    }

    /// Header plus every blob.
    pub fn total_len(&self) -> u64 {
        self.header_len() as u64 + self.element_sizes.iter().map(|&s| s as u64).sum::<u64>()
    }
}

/// Parse and check the header against the buffer length.
pub fn read_header(bytes: &[u8]) -> Result<XktHeader> {
    let version = read_u32(bytes, 0)?;
    if version != XKT_VERSION {
        return Err(Error::UnsupportedVersion {
            found: version,
            expected: XKT_VERSION,
        });
    }

    let count = read_u32(bytes, 1)?;
    if count as usize != NUM_ELEMENTS {
        return Err(Error::ElementCount {
            found: count,
            expected: NUM_ELEMENTS as u32,
        });
    }

    let element_sizes = (0..NUM_ELEMENTS)
        .map(|i| read_u32(bytes, 2 + i))
        .collect::<Result<Vec<_>>>()?;
    let header = XktHeader {
        version,
        element_sizes,
    };

    let needed = header.total_len();
    if needed > bytes.len() as u64 {
        return Err(Error::Truncated {
            needed,
            available: bytes.len() as u64,
        });
    }
    if needed < bytes.len() as u64 {
        tracing::warn!(
            trailing = bytes.len() as u64 - needed,
            "ignoring bytes after last XKT element"
        );
    }
    Ok(header)
}

/// Read a buffer compressed with zlib.
pub fn read_xkt(bytes: &[u8]) -> Result<XktData> {
    read_xkt_with(bytes, &ZlibCodec::default())
}

/// Read a buffer with a custom codec.
pub fn read_xkt_with<C: Codec>(bytes: &[u8], codec: &C) -> Result<XktData> {
    let header = read_header(bytes)?;

    let mut offset = header.header_len();
    let mut elements = Vec::with_capacity(NUM_ELEMENTS);
    for &size in &header.element_sizes {
        let end = offset + size as usize;
        elements.push(codec.decompress(&bytes[offset..end])?);
        offset = end;
    }

    XktData::decode_elements(&elements)
}
