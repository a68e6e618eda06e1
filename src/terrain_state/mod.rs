//! # Terrain State Module
//!
//! The orchestrator that owns a world and drives its generation and meshing.
//!
//! ## Key Components
//!
//! * `TerrainState` - The main state container for one world
//! * `noise` - Seeded lattice noise and fractal sums
//! * `generation` - Field sampling, terrain rules and column generation
//! * `voxels` - Block codes, chunks, columns and the world arena
//! * `meshing` - Greedy meshing and mesh storage
//! * `task_management` - Cooperative tasks on worker threads or inline
//!
//! ## Architecture
//!
//! `TerrainState` holds the world, the mesh manager and the sample pool as
//! shared resources, and the task manager that advances everything. A host
//! requests columns, calls [`TerrainState::process_tasks`] once per frame,
//! and collects meshes whose slots report complete.
//!
//! ```
//! use cgmath::Point2;
//! use voxel_terrain::config::WorldConfig;
//! use voxel_terrain::terrain_state::TerrainState;
//!
//! let config = WorldConfig {
//!     height_in_chunks: 2,
//!     multithreading: false,
//!     ..Default::default()
//! };
//! let mut terrain = TerrainState::new(&config).unwrap();
//! terrain.request_column(Point2::new(0, 0)).unwrap();
//! terrain.run_until_idle();
//! assert_eq!(terrain.world().get().chunk_count(), 2);
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use cgmath::{Point2, Point3};
use image::{Rgb, RgbImage};
use log::{debug, info};
use ::noise::NoiseFn;

use crate::config::WorldConfig;
use crate::core::MtResource;
use crate::error::{TerrainError, TerrainResult};

pub mod generation;
pub mod meshing;
pub mod noise;
pub mod task_management;
pub mod voxels;

use generation::{
    tasks::{ColumnGenerationTask, ColumnTargets, FieldExpansionTask, FieldSampleTask},
    ColumnGenerator, FieldKind, Region, SamplePool, SampleSet, WorldContext,
};
use meshing::{tasks::ChunkMeshGenerationTask, MeshData, MeshManager, MeshPass};
use task_management::{budget::WorkBudget, default_worker_count, TaskManager};
use voxels::{BlockCode, World, CHUNK_DIMENSION};

/// Name of the palette atlas preview.
pub const PALETTE_PREVIEW: &str = "palette.png";
/// Name of the spawn map preview.
pub const SPAWN_MAP_PREVIEW: &str = "spawn_map.png";

/// The state of one generated world.
///
/// # Examples
///
/// ```
/// use cgmath::{Point2, Point3};
/// use voxel_terrain::config::WorldConfig;
/// use voxel_terrain::terrain_state::{meshing::MeshPass, TerrainState};
///
/// let config = WorldConfig {
///     height_in_chunks: 1,
///     multithreading: false,
///     ..Default::default()
/// };
/// let mut terrain = TerrainState::new(&config).unwrap();
/// terrain.request_column(Point2::new(0, 0)).unwrap();
///
/// // Main loop
/// while !terrain.is_idle() {
///     terrain.process_tasks();
/// }
/// assert!(terrain.is_chunk_meshed(Point3::new(0, 0, 0)));
/// let mesh = terrain.take_mesh(Point3::new(0, 0, 0), MeshPass::Opaque);
/// assert!(mesh.is_some());
/// ```
pub struct TerrainState {
    /// Everything derived from the seed
    context: Arc<WorldContext>,
    /// Columns and chunks
    world: MtResource<World>,
    /// Finished meshes
    mesh_manager: MtResource<MeshManager>,
    /// Recycled field buffers
    pool: MtResource<SamplePool>,
    /// Task manager for generation and meshing
    task_manager: TaskManager,
}

impl TerrainState {
    /// Creates a world from a configuration.
    ///
    /// # Errors
    /// [`TerrainError::InvalidConfig`] if the configuration does not validate.
    pub fn new(config: &WorldConfig) -> TerrainResult<Self> {
        let context = Arc::new(WorldContext::new(config)?);
        let workers = if config.multithreading {
            config.worker_count.unwrap_or_else(default_worker_count)
        } else {
            0
        };

        info!(
            "Terrain state ready: {} chunks per column, sample rate {}, {} workers",
            config.height_in_chunks, config.sample_rate, workers
        );

        Ok(TerrainState {
            world: MtResource::new(World::new(config.height_in_chunks)),
            mesh_manager: MtResource::new(MeshManager::new(config.mesh_cache_capacity)),
            pool: MtResource::new(SamplePool::new()),
            task_manager: TaskManager::new(
                workers,
                WorkBudget::from_micros(config.step_budget_micros),
                WorkBudget::from_micros(config.frame_budget_micros),
            ),
            context,
        })
    }

    /// The world's context.
    pub fn context(&self) -> &Arc<WorldContext> {
        &self.context
    }

    /// The voxel world.
    pub fn world(&self) -> &MtResource<World> {
        &self.world
    }

    /// The mesh manager.
    pub fn mesh_manager(&self) -> &MtResource<MeshManager> {
        &self.mesh_manager
    }

    /// The sample buffer pool.
    pub fn sample_pool(&self) -> &MtResource<SamplePool> {
        &self.pool
    }

    /// The task manager.
    pub fn task_manager(&self) -> &TaskManager {
        &self.task_manager
    }

    fn targets(&self) -> ColumnTargets {
        ColumnTargets {
            world: self.world.clone(),
            mesh_manager: self.mesh_manager.clone(),
            pool: self.pool.clone(),
            context: self.context.clone(),
        }
    }

    /// Schedules generation of a column.
    ///
    /// Publishes a sample and an expansion task per dense field plus the
    /// column task that waits on them.
    ///
    /// # Returns
    /// `false` if the column is already loaded or pending.
    pub fn request_column(&mut self, position: Point2<i32>) -> TerrainResult<bool> {
        let context = self.context.clone();
        let region = Region::for_column(position, context.height_in_chunks, context.sample_rate)?;
        let Some(token) = self.world.get_mut().reserve_column(position) else {
            return Ok(false);
        };

        let samples = SampleSet::new(region, context.sample_rate, &context.fields, &mut self.pool.get_mut());
        for kind in FieldKind::ALL {
            let field = samples.field(kind).clone();
            self.task_manager
                .publish_task(Box::new(FieldSampleTask::new(context.table.clone(), field.clone())));
            self.task_manager
                .publish_task(Box::new(FieldExpansionTask::new(field)));
        }

        let generator = ColumnGenerator::new(context, position, samples);
        self.task_manager
            .publish_task(Box::new(ColumnGenerationTask::new(generator, token, self.targets())));
        debug!("Requested column {:?} (token {})", position, token);
        Ok(true)
    }

    /// Requests every column within `radius` columns of `center`, a square area.
    ///
    /// # Returns
    /// Number of newly requested columns.
    pub fn request_area(&mut self, center: Point2<i32>, radius: i32) -> TerrainResult<usize> {
        let mut requested = 0;
        for z in -radius..=radius {
            for x in -radius..=radius {
                if self.request_column(Point2::new(center.x + x, center.y + z))? {
                    requested += 1;
                }
            }
        }
        Ok(requested)
    }

    /// Unloads a column, its meshes and its sample buffers.
    ///
    /// Chunks beside the column are re-meshed, since their boundary now
    /// faces unloaded space.
    ///
    /// # Returns
    /// `false` if no such column was loaded or pending.
    pub fn unload_column(&mut self, position: Point2<i32>) -> bool {
        let (column, stale) = {
            let mut world = self.world.get_mut();
            let Some(column) = world.remove_column(position) else {
                return false;
            };
            let stale = if column.is_generated() {
                world.invalidate_column_neighbours(position)
            } else {
                Vec::new()
            };
            (column, stale)
        };

        {
            let mut meshes = self.mesh_manager.get_mut();
            for y in 0..self.context.height_in_chunks {
                meshes.remove_chunk(Point3::new(position.x, y, position.y));
            }
        }
        if let Some(samples) = column.samples {
            samples.release(&mut self.pool.get_mut());
        }
        self.remesh(stale);
        info!("Unloaded column {:?}", position);
        true
    }

    fn remesh(&mut self, chunk_positions: Vec<Point3<i32>>) {
        for position in chunk_positions {
            for task in
                ChunkMeshGenerationTask::for_both_passes(&self.world, &self.mesh_manager, &self.context, position)
            {
                self.task_manager.publish_task(task);
            }
        }
    }

    /// Advances every task by one frame's worth of work.
    pub fn process_tasks(&mut self) {
        self.task_manager.process_completed_tasks();
        self.task_manager.process_queued_tasks();
    }

    /// Runs tasks until nothing is left.
    ///
    /// # Returns
    /// Wall-clock time spent.
    pub fn run_until_idle(&mut self) -> Duration {
        self.task_manager.run_until_idle()
    }

    /// Whether no task is queued or in flight.
    pub fn is_idle(&self) -> bool {
        self.task_manager.is_idle()
    }

    /// Block at a world voxel coordinate, [`voxels::NULL`] where nothing is loaded.
    pub fn get_block(&self, position: Point3<i32>) -> BlockCode {
        self.world.get().get_block(position)
    }

    /// Writes a block and schedules re-meshing of every affected chunk.
    ///
    /// # Errors
    /// [`TerrainError::InvalidBlock`] for codes that are not air or a palette
    /// block, [`TerrainError::OutOfBounds`] if no loaded chunk owns the coordinate.
    pub fn set_block(&mut self, position: Point3<i32>, code: BlockCode) -> TerrainResult<()> {
        let stale = self.world.get_mut().set_block(position, code)?;
        debug!("Set {:?} to {}, re-meshing {} chunks", position, code, stale.len());
        self.remesh(stale);
        Ok(())
    }

    /// Whether both mesh passes of a chunk are current.
    pub fn is_chunk_meshed(&self, chunk_position: Point3<i32>) -> bool {
        let meshes = self.mesh_manager.get();
        MeshPass::ALL
            .iter()
            .all(|pass| meshes.is_complete(chunk_position, *pass))
    }

    /// Hands a finished mesh to the caller.
    pub fn take_mesh(&mut self, chunk_position: Point3<i32>, pass: MeshPass) -> Option<MeshData> {
        self.mesh_manager.get_mut().take_mesh(chunk_position, pass)
    }

    /// First height at a world (x, z) where solid ground gives way to open space.
    pub fn spawn_height(&self, x: i32, z: i32) -> Option<i32> {
        let world = self.world.get();
        let column = world.column_at(Point2::new(x.div_euclid(CHUNK_DIMENSION), z.div_euclid(CHUNK_DIMENSION)))?;
        let cell = column.spawn_map.as_ref()?.get(
            x.rem_euclid(CHUNK_DIMENSION) as usize,
            z.rem_euclid(CHUNK_DIMENSION) as usize,
        )?;
        cell.height
    }

    /// The palette atlas.
    pub fn palette_image(&self) -> RgbImage {
        self.context.palette.atlas_image()
    }

    /// Column extent of every generated column: minimum and maximum corner.
    fn generated_extent(&self) -> Option<(Point2<i32>, Point2<i32>)> {
        let world = self.world.get();
        world
            .columns()
            .filter(|column| column.is_generated())
            .map(|column| column.position)
            .fold(None, |extent, p| match extent {
                None => Some((p, p)),
                Some((min, max)) => Some((
                    Point2::new(min.x.min(p.x), min.y.min(p.y)),
                    Point2::new(max.x.max(p.x), max.y.max(p.y)),
                )),
            })
    }

    /// One pixel per voxel column of every generated column.
    ///
    /// Spawnable cells are grey by spawn intensity; cells without a spawn
    /// height are dark red; missing columns stay black.
    pub fn spawn_map_image(&self) -> RgbImage {
        let Some((min, max)) = self.generated_extent() else {
            return RgbImage::new(1, 1);
        };
        let size = CHUNK_DIMENSION as u32;
        let width = (max.x - min.x + 1) as u32 * size;
        let height = (max.y - min.y + 1) as u32 * size;
        let mut image = RgbImage::new(width, height);

        let world = self.world.get();
        for column in world.columns() {
            let Some(spawn_map) = column.spawn_map.as_ref() else {
                continue;
            };
            let offset_x = (column.position.x - min.x) as u32 * size;
            let offset_z = (column.position.y - min.y) as u32 * size;
            for z in 0..spawn_map.size() {
                for x in 0..spawn_map.size() {
                    let Some(cell) = spawn_map.get(x, z) else {
                        continue;
                    };
                    let pixel = match cell.height {
                        Some(_) => Rgb([cell.intensity; 3]),
                        None => Rgb([96, 0, 0]),
                    };
                    image.put_pixel(offset_x + x as u32, offset_z + z as u32, pixel);
                }
            }
        }
        image
    }

    /// A horizontal slice of a dense field at height `y`, over the generated area.
    ///
    /// # Arguments
    /// * `name` - `"cave"`, `"pattern"` (or `"glass"`) or `"stripe"`
    /// * `y` - World height of the slice
    ///
    /// # Errors
    /// [`TerrainError::InvalidConfig`] for an unknown field name.
    pub fn field_slice_image(&self, name: &str, y: i32) -> TerrainResult<RgbImage> {
        let kind = FieldKind::from_name(name)
            .ok_or_else(|| TerrainError::InvalidConfig(format!("unknown field {name:?}")))?;
        let (min, max) = self.generated_extent().unwrap_or((Point2::new(0, 0), Point2::new(0, 0)));
        let field = self.context.bound_field(kind);
        let size = CHUNK_DIMENSION as u32;
        let width = (max.x - min.x + 1) as u32 * size;
        let height = (max.y - min.y + 1) as u32 * size;

        Ok(RgbImage::from_fn(width, height, |px, pz| {
            let x = f64::from(min.x * CHUNK_DIMENSION) + f64::from(px);
            let z = f64::from(min.y * CHUNK_DIMENSION) + f64::from(pz);
            let value = field.get([x, f64::from(y), z]);
            let shade = ((value + 1.0) * 127.5).clamp(0.0, 255.0) as u8;
            Rgb([shade; 3])
        }))
    }

    /// Writes the palette atlas and spawn map previews into `directory`.
    pub fn save_previews(&self, directory: &Path) -> TerrainResult<()> {
        std::fs::create_dir_all(directory)?;
        let palette = directory.join(PALETTE_PREVIEW);
        self.palette_image().save(&palette)?;
        let spawn_map = directory.join(SPAWN_MAP_PREVIEW);
        self.spawn_map_image().save(&spawn_map)?;
        info!("Wrote {} and {}", palette.display(), spawn_map.display());
        Ok(())
    }
}
