//! # Core Module
//!
//! Shared-ownership and allocation primitives used throughout the terrain core.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking
//! - `BufferPool`: Free-list of scratch buffers keyed by length
//!
//! ## Usage
//! ```rust
//! use voxel_terrain::core::{BufferPool, MtResource};
//!
//! // Thread-safe resource
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//!
//! // Pooled scratch buffer, zeroed on checkout
//! let mut pool = BufferPool::<i32>::new();
//! let buffer = pool.checkout(64);
//! assert!(buffer.iter().all(|v| *v == 0));
//! pool.checkin(buffer);
//! ```

pub mod mt_resource;
pub mod pool;

pub use mt_resource::MtResource;
pub use pool::BufferPool;
