//! # World Module
//!
//! The `World` owns every loaded column and chunk.
//!
//! ## Architecture
//!
//! Columns and chunks live in two slot arenas. Freed slots go onto a free
//! list and are reused by the next insertion, and position indices map
//! coordinates to slots. A chunk knows its column by slot index and a column
//! lists its chunks by slot index, so neither owns the other.
//!
//! ## Lookups
//!
//! [`World::get_block`] never fails: coordinates outside any built chunk
//! return [`NULL`], which the mesher and terrain rules treat as "unknown".
//! Edits through [`World::set_block`] do fail for such coordinates.

use std::collections::HashMap;

use cgmath::{Point2, Point3};
use log::{debug, info};

use crate::error::{TerrainError, TerrainResult};
use crate::terrain_state::generation::{SampleSet, SpawnMap};

use super::{
    block::{BlockCode, BlockType, NULL},
    chunk::{chunk_position_of, local_position_of, BlockGrid, Chunk, CHUNK_DIMENSION},
    column::Column,
};

/// Anything that can answer "what block is at this world coordinate".
///
/// The mesher consults this for voxels just outside the chunk it is
/// building. Implementations return [`NULL`] where they have no data.
pub trait BlockLookup {
    /// Code of the voxel at a world coordinate.
    fn block_at(&self, position: Point3<i32>) -> BlockCode;
}

impl<F> BlockLookup for F
where
    F: Fn(Point3<i32>) -> BlockCode,
{
    fn block_at(&self, position: Point3<i32>) -> BlockCode {
        self(position)
    }
}

/// Generation output for one column, on its way into the world.
#[derive(Debug)]
pub struct ColumnInstall {
    /// Column coordinates.
    pub position: Point2<i32>,
    /// Token of the request that produced this output.
    pub token: u64,
    /// One grid per chunk, bottom to top.
    pub grids: Vec<BlockGrid>,
    /// Spawn data for the column.
    pub spawn_map: SpawnMap,
    /// The sample buffers used.
    pub samples: SampleSet,
}

/// The voxel world: an arena of columns and chunks.
pub struct World {
    chunks: Vec<Option<Chunk>>,
    free_chunks: Vec<usize>,
    columns: Vec<Option<Column>>,
    free_columns: Vec<usize>,
    chunk_index: HashMap<Point3<i32>, usize>,
    column_index: HashMap<Point2<i32>, usize>,
    height_in_chunks: i32,
    next_token: u64,
}

impl World {
    /// Creates an empty world whose columns are `height_in_chunks` tall.
    pub fn new(height_in_chunks: i32) -> Self {
        World {
            chunks: Vec::new(),
            free_chunks: Vec::new(),
            columns: Vec::new(),
            free_columns: Vec::new(),
            chunk_index: HashMap::new(),
            column_index: HashMap::new(),
            height_in_chunks: height_in_chunks.max(1),
            next_token: 1,
        }
    }

    /// Number of chunks per column.
    pub fn height_in_chunks(&self) -> i32 {
        self.height_in_chunks
    }

    /// Claims a slot for a column about to be generated.
    ///
    /// # Returns
    /// The request token, or `None` if the column is already present.
    pub fn reserve_column(&mut self, position: Point2<i32>) -> Option<u64> {
        if self.column_index.contains_key(&position) {
            return None;
        }
        let token = self.next_token;
        self.next_token += 1;

        let column = Column::reserved(position, token);
        let slot = match self.free_columns.pop() {
            Some(slot) => {
                self.columns[slot] = Some(column);
                slot
            }
            None => {
                self.columns.push(Some(column));
                self.columns.len() - 1
            }
        };
        self.column_index.insert(position, slot);
        Some(token)
    }

    /// Moves generated grids into the world.
    ///
    /// # Returns
    /// - `Ok(positions)` of the installed chunks
    /// - `Err(install)` if the column was unloaded or re-requested meanwhile,
    ///   handing the payload back so its buffers can be recycled
    pub fn install_column(&mut self, install: ColumnInstall) -> Result<Vec<Point3<i32>>, ColumnInstall> {
        let Some(&column_slot) = self.column_index.get(&install.position) else {
            return Err(install);
        };
        let current = self.columns[column_slot].as_ref().map(|c| (c.token, c.is_generated()));
        if current != Some((install.token, false)) {
            return Err(install);
        }

        let ColumnInstall {
            position,
            grids,
            spawn_map,
            samples,
            ..
        } = install;

        let mut slots = Vec::with_capacity(grids.len());
        let mut positions = Vec::with_capacity(grids.len());
        for (y, grid) in grids.into_iter().enumerate() {
            let chunk_position = Point3::new(position.x, y as i32, position.y);
            let chunk = Chunk::new(chunk_position, column_slot, grid);
            let slot = match self.free_chunks.pop() {
                Some(slot) => {
                    self.chunks[slot] = Some(chunk);
                    slot
                }
                None => {
                    self.chunks.push(Some(chunk));
                    self.chunks.len() - 1
                }
            };
            self.chunk_index.insert(chunk_position, slot);
            slots.push(slot);
            positions.push(chunk_position);
        }

        if let Some(column) = self.columns[column_slot].as_mut() {
            column.chunks = slots;
            column.spawn_map = Some(spawn_map);
            column.samples = Some(samples);
        }
        info!("Installed column {:?} with {} chunks", position, positions.len());
        Ok(positions)
    }

    /// Marks the chunks of the four horizontally adjacent columns as changed.
    ///
    /// Their boundary faces were meshed against [`NULL`] while `position`
    /// was missing, so any mesh built before now is stale.
    ///
    /// # Returns
    /// Positions of the affected built chunks.
    pub fn invalidate_column_neighbours(&mut self, position: Point2<i32>) -> Vec<Point3<i32>> {
        let mut stale = Vec::new();
        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            for y in 0..self.height_in_chunks {
                let neighbour = Point3::new(position.x + dx, y, position.y + dz);
                if let Some(chunk) = self.chunk_at_mut(neighbour).filter(|chunk| chunk.built) {
                    chunk.revision += 1;
                    stale.push(neighbour);
                }
            }
        }
        stale
    }

    /// Removes a column and all of its chunks.
    ///
    /// # Returns
    /// The removed column, still holding its sample buffers.
    pub fn remove_column(&mut self, position: Point2<i32>) -> Option<Column> {
        let slot = self.column_index.remove(&position)?;
        let column = self.columns[slot].take()?;
        self.free_columns.push(slot);

        for &chunk_slot in &column.chunks {
            if let Some(chunk) = self.chunks[chunk_slot].take() {
                self.chunk_index.remove(&chunk.position);
                self.free_chunks.push(chunk_slot);
            }
        }
        debug!("Removed column {:?}", position);
        Some(column)
    }

    /// The column at `position`, generated or not.
    pub fn column_at(&self, position: Point2<i32>) -> Option<&Column> {
        let slot = *self.column_index.get(&position)?;
        self.columns[slot].as_ref()
    }

    /// Every loaded column.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().flatten()
    }

    /// Number of column slots in use.
    pub fn column_count(&self) -> usize {
        self.column_index.len()
    }

    /// The chunk at chunk coordinates `position`.
    pub fn chunk_at(&self, position: Point3<i32>) -> Option<&Chunk> {
        let slot = *self.chunk_index.get(&position)?;
        self.chunks[slot].as_ref()
    }

    /// The chunk at `position`, mutably.
    pub fn chunk_at_mut(&mut self, position: Point3<i32>) -> Option<&mut Chunk> {
        let slot = *self.chunk_index.get(&position)?;
        self.chunks[slot].as_mut()
    }

    /// Number of loaded chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunk_index.len()
    }

    /// Positions of every loaded chunk.
    pub fn chunk_positions(&self) -> Vec<Point3<i32>> {
        self.chunk_index.keys().copied().collect()
    }

    /// Block at a world voxel coordinate, [`NULL`] if no built chunk owns it.
    pub fn get_block(&self, position: Point3<i32>) -> BlockCode {
        match self.chunk_at(chunk_position_of(position)) {
            Some(chunk) if chunk.built => chunk.grid.get(local_position_of(position)),
            _ => NULL,
        }
    }

    /// Writes a block and marks the voxel changed.
    ///
    /// # Returns
    /// Chunk positions whose meshes are now stale: the edited chunk plus any
    /// loaded neighbour across a boundary the voxel touches.
    ///
    /// # Errors
    /// [`TerrainError::InvalidBlock`] for codes that decode to [`NULL`], and
    /// [`TerrainError::OutOfBounds`] if no built chunk owns the coordinate.
    pub fn set_block(&mut self, position: Point3<i32>, code: BlockCode) -> TerrainResult<Vec<Point3<i32>>> {
        if BlockType::from_code(code) == BlockType::NULL {
            return Err(TerrainError::InvalidBlock(code));
        }
        let chunk_position = chunk_position_of(position);
        let local = local_position_of(position);
        match self.chunk_at_mut(chunk_position) {
            Some(chunk) if chunk.built => {
                chunk.edit(local, code);
            }
            _ => return Err(TerrainError::OutOfBounds(position)),
        }

        let mut stale = vec![chunk_position];
        for axis in 0..3 {
            let offset = if local[axis] == 0 {
                -1
            } else if local[axis] == CHUNK_DIMENSION - 1 {
                1
            } else {
                continue;
            };
            let mut neighbour = chunk_position;
            neighbour[axis] += offset;
            // The neighbour's mesh reads this voxel, so meshes built before the edit are stale too.
            if let Some(chunk) = self.chunk_at_mut(neighbour).filter(|chunk| chunk.built) {
                chunk.revision += 1;
                stale.push(neighbour);
            }
        }
        Ok(stale)
    }
}

impl BlockLookup for World {
    fn block_at(&self, position: Point3<i32>) -> BlockCode {
        self.get_block(position)
    }
}
