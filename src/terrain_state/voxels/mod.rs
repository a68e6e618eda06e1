//! # Voxel Storage
//!
//! Block codes, chunks, columns and the world arena that owns them.
//!
//! ## Architecture
//!
//! * **Block**: the compact code stored per voxel and its decoded variant
//! * **Chunk**: a dense 16³ grid of codes plus edit tracking
//! * **Column**: the vertical stack of chunks generated together
//! * **World**: slot arenas for columns and chunks with coordinate indices
//!
//! ## Data Flow
//!
//! 1. A column slot is reserved when generation is requested
//! 2. Generation fills one grid per chunk off the main thread
//! 3. The grids are installed into the world and the chunks marked built
//! 4. Edits go through the world, which reports which chunk meshes went stale
//!
//! ## Thread Safety
//!
//! The world is shared with mesh tasks through an `MtResource`. Edits are
//! expected to be serialised through the owning thread.

pub mod block;
pub mod chunk;
pub mod column;
pub mod world;

pub use block::{block_side::BlockSide, BlockCode, BlockType, AIR, NULL, PALETTE_LENGTH};
pub use chunk::{BlockGrid, Chunk, CHUNK_DIMENSION};
pub use column::Column;
pub use world::{BlockLookup, ColumnInstall, World};
