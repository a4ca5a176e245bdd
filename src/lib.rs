//! An archetype-style entity component system.
//!
//! Entities sharing one exact set of component types and tags live together in a
//! [cluster](clusters::Cluster), stored column by column. Structural changes made inside a
//! [task](tasks::TaskContext) are buffered and applied when the task ends, so concurrently running tasks
//! only ever see a stable layout.

extern crate self as cluster_ecs;

mod data_structures;
pub mod components;
pub mod entities;
pub mod clusters;
pub mod world;
pub mod tasks;
pub mod jobs;
pub mod error;
mod resolver;

pub use lazy_static::lazy_static;

pub mod prelude {
	pub use crate::components::*;
	pub use crate::component_types;
	pub use crate::entities::{Entity, EntityAddress, Tag};
	pub use crate::clusters::{Chunk, Cluster, ClusterId};
	pub use crate::world::{World, WorldConfig};
	pub use crate::tasks::{TaskContext, TaskMode};
	pub use crate::jobs::{JobId, JobRegistry, JobSystem, INVALID_JOB_ID};
	pub use crate::error::{EcsError, EcsResult};
}

#[cfg(test)]
mod tests;
