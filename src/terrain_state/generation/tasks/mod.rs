//! Background tasks for terrain generation.
//!
//! A column is generated by seven cooperating tasks over one
//! [`super::SampleSet`]:
//!
//! - `FieldSampleTask` x3: coarse samples of the cave, pattern and stripe fields
//! - `FieldExpansionTask` x3: trilinear expansion, each waiting on its sample task
//! - `ColumnGenerationTask`: voxel assignment, waiting on every expansion
//!
//! The tasks only synchronise through the `sampled` and `complete` flags of
//! the shared field regions, so they can be published together in any order.

pub mod column_generation_task;
pub mod field_expansion_task;
pub mod field_sample_task;

pub use column_generation_task::{ColumnGenerationTask, ColumnTargets};
pub use field_expansion_task::FieldExpansionTask;
pub use field_sample_task::FieldSampleTask;
