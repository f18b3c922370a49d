// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XKT v6 element table.

/// Format version written in the first header word.
pub const XKT_VERSION: u32 = 6;

/// Number of element blobs following the header.
pub const NUM_ELEMENTS: usize = 16;

/// Element blobs in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Positions,
    Normals,
    Indices,
    EdgeIndices,
    Matrices,
    ReusedPrimitivesDecodeMatrix,
    EachPrimitivePositionsAndNormalsPortion,
    EachPrimitiveIndicesPortion,
    EachPrimitiveEdgeIndicesPortion,
    EachPrimitiveColorAndOpacity,
    PrimitiveInstances,
    EachEntityId,
    EachEntityPrimitiveInstancesPortion,
    EachEntityMatricesPortion,
    EachTileAabb,
    EachTileEntitiesPortion,
}

impl Element {
    pub const ALL: [Element; NUM_ELEMENTS] = [
        Element::Positions,
        Element::Normals,
        Element::Indices,
        Element::EdgeIndices,
        Element::Matrices,
        Element::ReusedPrimitivesDecodeMatrix,
        Element::EachPrimitivePositionsAndNormalsPortion,
        Element::EachPrimitiveIndicesPortion,
        Element::EachPrimitiveEdgeIndicesPortion,
        Element::EachPrimitiveColorAndOpacity,
        Element::PrimitiveInstances,
        Element::EachEntityId,
        Element::EachEntityPrimitiveInstancesPortion,
        Element::EachEntityMatricesPortion,
        Element::EachTileAabb,
        Element::EachTileEntitiesPortion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Element::Positions => "positions",
            Element::Normals => "normals",
            Element::Indices => "indices",
            Element::EdgeIndices => "edgeIndices",
            Element::Matrices => "matrices",
            Element::ReusedPrimitivesDecodeMatrix => "reusedPrimitivesDecodeMatrix",
            Element::EachPrimitivePositionsAndNormalsPortion => {
                "eachPrimitivePositionsAndNormalsPortion"
            }
            Element::EachPrimitiveIndicesPortion => "eachPrimitiveIndicesPortion",
            Element::EachPrimitiveEdgeIndicesPortion => "eachPrimitiveEdgeIndicesPortion",
            Element::EachPrimitiveColorAndOpacity => "eachPrimitiveColorAndOpacity",
            Element::PrimitiveInstances => "primitiveInstances",
            Element::EachEntityId => "eachEntityId",
            Element::EachEntityPrimitiveInstancesPortion => "eachEntityPrimitiveInstancesPortion",
            Element::EachEntityMatricesPortion => "eachEntityMatricesPortion",
            Element::EachTileAabb => "eachTileAABB",
            Element::EachTileEntitiesPortion => "eachTileEntitiesPortion",
        }
    }

    /// Byte width of one array item (1 for the JSON text).
    pub fn item_width(self) -> usize {
        match self {
            Element::Normals | Element::EachPrimitiveColorAndOpacity | Element::EachEntityId => 1,
            Element::Positions => 2,
            Element::EachTileAabb => 8,
            _ => 4,
        }
    }
}
