//! Background tasks for the meshing system.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: Generates one mesh pass of a chunk

pub mod chunk_mesh_generation_task;

pub use chunk_mesh_generation_task::{ChunkMeshGenerationTask, ChunkMeshGenerationTaskResult};
