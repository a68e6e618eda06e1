//! # Block Side Module
//!
//! The six faces of a voxel and their relation to the three sweep axes of
//! the mesher.

use cgmath::Vector3;
use num_derive::FromPrimitive;

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a unique integer value so it can be stored in
/// vertex data and decoded again with [`num::FromPrimitive`].
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, FromPrimitive)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The face whose normal points along `axis` (0 = x, 1 = y, 2 = z).
    ///
    /// # Arguments
    /// * `axis` - Swept axis of the mesher
    /// * `positive` - `true` for the face looking toward increasing coordinates
    pub fn from_axis(axis: usize, positive: bool) -> BlockSide {
        match (axis % 3, positive) {
            (0, true) => BlockSide::RIGHT,
            (0, false) => BlockSide::LEFT,
            (1, true) => BlockSide::TOP,
            (1, false) => BlockSide::BOTTOM,
            (_, true) => BlockSide::FRONT,
            (_, false) => BlockSide::BACK,
        }
    }

    /// The axis this face is perpendicular to.
    pub fn axis(self) -> usize {
        match self {
            BlockSide::LEFT | BlockSide::RIGHT => 0,
            BlockSide::BOTTOM | BlockSide::TOP => 1,
            BlockSide::FRONT | BlockSide::BACK => 2,
        }
    }

    /// Whether the normal points toward increasing coordinates.
    pub fn is_positive(self) -> bool {
        matches!(self, BlockSide::RIGHT | BlockSide::TOP | BlockSide::FRONT)
    }

    /// Unit normal of the face.
    pub fn normal(self) -> Vector3<i32> {
        let sign = if self.is_positive() { 1 } else { -1 };
        let mut normal = Vector3::new(0, 0, 0);
        normal[self.axis()] = sign;
        normal
    }

    /// Shade row of the palette atlas used for this face: top, side or bottom.
    pub fn shade_row(self) -> u32 {
        match self {
            BlockSide::TOP => 0,
            BlockSide::BOTTOM => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_round_trip() {
        for side in BlockSide::all() {
            assert_eq!(BlockSide::from_axis(side.axis(), side.is_positive()), side);
        }
    }

    #[test]
    fn discriminants_decode() {
        for side in BlockSide::all() {
            let decoded: Option<BlockSide> = num::FromPrimitive::from_u32(side as u32);
            assert_eq!(decoded, Some(side));
        }
        let missing: Option<BlockSide> = num::FromPrimitive::from_u32(6);
        assert_eq!(missing, None);
    }

    #[test]
    fn normals_match_documented_directions() {
        assert_eq!(BlockSide::FRONT.normal(), Vector3::new(0, 0, 1));
        assert_eq!(BlockSide::LEFT.normal(), Vector3::new(-1, 0, 0));
        assert_eq!(BlockSide::BOTTOM.normal(), Vector3::new(0, -1, 0));
    }
}
