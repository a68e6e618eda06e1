//! # Chunk Module
//!
//! Dense block storage for one 16x16x16 cube of the world.
//!
//! Unlike a sparse solid-bit layout, terrain chunks are mostly non-air and
//! are written in a single pass by generation, so every voxel keeps its
//! full [`BlockCode`]. Codes are laid out with x varying fastest, then y,
//! then z: `index = x + DIM * y + DIM * DIM * z`.

use bitvec::prelude::BitVec;
use cgmath::{Point3, Vector3};

use super::block::{BlockCode, AIR, NULL};

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// A dense box of block codes.
///
/// Chunks always use 16³ grids; other shapes exist so the mesher can be
/// exercised on small hand-built grids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockGrid {
    dimensions: Vector3<i32>,
    codes: Vec<BlockCode>,
}

impl BlockGrid {
    /// Creates a grid of the given shape filled with `fill`.
    ///
    /// Non-positive dimensions produce an empty grid.
    pub fn new(dimensions: Vector3<i32>, fill: BlockCode) -> Self {
        let dimensions = Vector3::new(dimensions.x.max(0), dimensions.y.max(0), dimensions.z.max(0));
        let len = (dimensions.x * dimensions.y * dimensions.z) as usize;
        BlockGrid {
            dimensions,
            codes: vec![fill; len],
        }
    }

    /// A chunk-sized grid of air.
    pub fn chunk() -> Self {
        BlockGrid::new(
            Vector3::new(CHUNK_DIMENSION, CHUNK_DIMENSION, CHUNK_DIMENSION),
            AIR,
        )
    }

    /// Shape of the grid.
    pub fn dimensions(&self) -> Vector3<i32> {
        self.dimensions
    }

    /// Whether `position` lies inside the grid.
    pub fn contains(&self, position: Point3<i32>) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.z >= 0
            && position.x < self.dimensions.x
            && position.y < self.dimensions.y
            && position.z < self.dimensions.z
    }

    #[inline]
    fn index(&self, position: Point3<i32>) -> usize {
        (position.x + self.dimensions.x * (position.y + self.dimensions.y * position.z)) as usize
    }

    /// The linear index of `position`, or `None` outside the grid.
    pub fn index_of(&self, position: Point3<i32>) -> Option<usize> {
        self.contains(position).then(|| self.index(position))
    }

    /// Code at `position`, [`NULL`] outside the grid.
    pub fn get(&self, position: Point3<i32>) -> BlockCode {
        match self.index_of(position) {
            Some(index) => self.codes[index],
            None => NULL,
        }
    }

    /// Writes `code` at `position`.
    ///
    /// # Returns
    /// `false` if the position is outside the grid and nothing was written.
    pub fn set(&mut self, position: Point3<i32>, code: BlockCode) -> bool {
        match self.index_of(position) {
            Some(index) => {
                self.codes[index] = code;
                true
            }
            None => false,
        }
    }

    /// Every code in storage order.
    pub fn codes(&self) -> &[BlockCode] {
        &self.codes
    }

    /// Number of voxels whose code satisfies `predicate`.
    pub fn count(&self, predicate: impl Fn(BlockCode) -> bool) -> usize {
        self.codes.iter().filter(|code| predicate(**code)).count()
    }
}

/// A loaded chunk.
#[derive(Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: Point3<i32>,
    /// Arena index of the owning column.
    pub column: usize,
    /// Block codes, written once by generation and then by edits.
    pub grid: BlockGrid,
    /// Set once generation has written every voxel.
    pub built: bool,
    /// Bumped on every edit; mesh results carry the revision they were built from.
    pub revision: u64,
    /// One bit per voxel, set when an edit touches it.
    pub changed: BitVec,
}

impl Chunk {
    /// Wraps a fully generated grid.
    ///
    /// # Arguments
    /// * `position` - Chunk coordinates
    /// * `column` - Arena index of the owning column
    /// * `grid` - Generated block codes
    pub fn new(position: Point3<i32>, column: usize, grid: BlockGrid) -> Self {
        let len = grid.codes().len();
        Chunk {
            position,
            column,
            grid,
            built: true,
            revision: 0,
            changed: BitVec::repeat(false, len),
        }
    }

    /// World-space coordinate of the chunk's minimum corner.
    pub fn origin(&self) -> Point3<i32> {
        chunk_origin(self.position)
    }

    /// Writes `code` at a local position, marking it changed.
    ///
    /// # Returns
    /// `false` if the position is outside the chunk.
    pub fn edit(&mut self, local: Point3<i32>, code: BlockCode) -> bool {
        let Some(index) = self.grid.index_of(local) else {
            return false;
        };
        self.grid.set(local, code);
        self.changed.set(index, true);
        self.revision += 1;
        true
    }

    /// Local positions of every edited voxel.
    pub fn changed_positions(&self) -> Vec<Point3<i32>> {
        self.changed
            .iter_ones()
            .map(|index| {
                let index = index as i32;
                Point3::new(
                    index % CHUNK_DIMENSION,
                    (index / CHUNK_DIMENSION) % CHUNK_DIMENSION,
                    index / CHUNK_PLANE_SIZE,
                )
            })
            .collect()
    }
}

/// Chunk coordinates owning a world voxel.
pub fn chunk_position_of(voxel: Point3<i32>) -> Point3<i32> {
    Point3::new(
        voxel.x.div_euclid(CHUNK_DIMENSION),
        voxel.y.div_euclid(CHUNK_DIMENSION),
        voxel.z.div_euclid(CHUNK_DIMENSION),
    )
}

/// Position of a world voxel inside its chunk.
pub fn local_position_of(voxel: Point3<i32>) -> Point3<i32> {
    Point3::new(
        voxel.x.rem_euclid(CHUNK_DIMENSION),
        voxel.y.rem_euclid(CHUNK_DIMENSION),
        voxel.z.rem_euclid(CHUNK_DIMENSION),
    )
}

/// World coordinate of a chunk's minimum corner.
pub fn chunk_origin(position: Point3<i32>) -> Point3<i32> {
    Point3::new(
        position.x * CHUNK_DIMENSION,
        position.y * CHUNK_DIMENSION,
        position.z * CHUNK_DIMENSION,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_is_x_fastest() {
        let mut grid = BlockGrid::chunk();
        grid.set(Point3::new(1, 0, 0), 1);
        grid.set(Point3::new(0, 1, 0), 2);
        grid.set(Point3::new(0, 0, 1), 3);
        assert_eq!(grid.codes()[1], 1);
        assert_eq!(grid.codes()[CHUNK_DIMENSION as usize], 2);
        assert_eq!(grid.codes()[CHUNK_PLANE_SIZE as usize], 3);
    }

    #[test]
    fn outside_reads_are_null() {
        let grid = BlockGrid::new(Vector3::new(2, 2, 2), AIR);
        assert_eq!(grid.get(Point3::new(2, 0, 0)), NULL);
        assert_eq!(grid.get(Point3::new(0, -1, 0)), NULL);
        assert_eq!(grid.get(Point3::new(1, 1, 1)), AIR);
    }

    #[test]
    fn edits_are_tracked() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0), 0, BlockGrid::chunk());
        assert!(chunk.edit(Point3::new(3, 4, 5), 7));
        assert!(!chunk.edit(Point3::new(16, 0, 0), 7));
        assert_eq!(chunk.revision, 1);
        assert_eq!(chunk.changed_positions(), vec![Point3::new(3, 4, 5)]);
    }

    #[test]
    fn negative_voxels_map_to_negative_chunks() {
        let voxel = Point3::new(-1, 17, -16);
        assert_eq!(chunk_position_of(voxel), Point3::new(-1, 1, -1));
        assert_eq!(local_position_of(voxel), Point3::new(15, 1, 0));
        assert_eq!(chunk_origin(Point3::new(-1, 1, -1)), Point3::new(-16, 16, -16));
    }
}
