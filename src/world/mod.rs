//! The [World] owns every entity, every [cluster](crate::clusters::Cluster) and the task schedule.

mod world_config;
mod world_storage;

pub use world_config::WorldConfig;

pub(crate) use world_storage::WorldStorage;

use crate::clusters::{Cluster, ClusterId};
use crate::components::ComponentType;
use crate::entities::{Entity, EntityAddress, EntityIdAllocator, Tag};
use crate::error::EcsResult;
use crate::jobs::{JobId, JobRegistry, JobSystem};
use crate::tasks::{ScheduleState, TaskMode};
use std::cell::UnsafeCell;
use parking_lot::Mutex;
use std::sync::Arc;

/// A container for entities and the clusters storing their components.
///
/// Methods taking `&mut self` act on the world directly and synchronously;
/// holding `&mut World` already proves no task is running.
/// Concurrent work goes through [TaskContexts](crate::tasks::TaskContext), which share `&World`
/// and are ordered against each other by the world's schedule.
pub struct World {
	config: WorldConfig,
	jobs: Arc<dyn JobSystem>,
	ids: EntityIdAllocator,
	schedule: Mutex<ScheduleState>,
	storage: UnsafeCell<WorldStorage>,
}

// SAFETY: `storage` is only read while a task is active and only written while an exclusive task is active,
// or through `&mut World`. The schedule guarantees no write overlaps any other access.
unsafe impl Sync for World {}

impl World {
	pub fn new() -> Self {
		Self::with_config(WorldConfig::default(), Arc::new(JobRegistry::new()))
	}

	pub fn with_config(config: WorldConfig, jobs: Arc<dyn JobSystem>) -> Self {
		Self {
			storage: UnsafeCell::new(WorldStorage::new(config.chunk_capacity, config.entity_capacity)),
			ids: EntityIdAllocator::new(),
			schedule: Mutex::new(ScheduleState::default()),
			config,
			jobs,
		}
	}

	pub fn config(&self) -> &WorldConfig {
		&self.config
	}

	pub fn jobs(&self) -> &Arc<dyn JobSystem> {
		&self.jobs
	}

	/// The cluster of entities without components or tags.
	pub fn empty_cluster(&self) -> ClusterId {
		ClusterId::default()
	}

	/// Finds the canonical [cluster](Cluster) for a set of components and tags, creating it if allowed.
	/// The order of `components` and `tags` does not matter.
	pub fn get_cluster(
		&mut self, components: &[ComponentType], tags: &[Tag], create_if_absent: bool,
	) -> Option<ClusterId> {
		self.storage.get_mut().get_cluster(components, tags, create_if_absent)
	}

	pub fn cluster(&mut self, id: ClusterId) -> &Cluster {
		self.storage.get_mut().cluster(id)
	}

	pub fn clusters(&mut self) -> impl Iterator<Item = &Cluster> {
		self.storage.get_mut().clusters()
	}

	/// Creates an entity in `cluster` with default-constructed components.
	pub fn new_entity(&mut self, cluster: ClusterId) -> Entity {
		let entity = self.ids.allocate();
		self.storage.get_mut().add_entity_record(entity, cluster);
		entity
	}

	/// Destroys an entity. Returns `false` if the handle is not live.
	pub fn delete_entity(&mut self, entity: Entity) -> bool {
		self.storage.get_mut().remove_entity(&self.ids, entity)
	}

	/// Destroys every entity of `cluster`. Returns the number of destroyed entities.
	pub fn remove_cluster_entities(&mut self, cluster: ClusterId) -> usize {
		self.storage.get_mut().remove_cluster_entities(&self.ids, cluster)
	}

	/// Destroys every entity of the world. Returns the number of destroyed entities.
	pub fn delete_all_entities(&mut self) -> usize {
		self.storage.get_mut().remove_all_entities(&self.ids)
	}

	/// Moves an entity into another cluster.
	///
	/// Components present in both clusters keep their values, components missing from `cluster`
	/// are destructed and components new to the entity are default-constructed.
	pub fn set_entity_cluster(&mut self, entity: Entity, cluster: ClusterId) -> EcsResult<()> {
		let storage = self.storage.get_mut();
		let (current, _) = storage.address(entity)?;
		if current.id() != cluster {
			storage.relocate(entity, cluster, |_| None);
		}
		Ok(())
	}

	pub fn get_entity(&mut self, entity: Entity) -> EcsResult<EntityAddress<'_>> {
		let (cluster, row) = self.storage.get_mut().address(entity)?;
		Ok(EntityAddress { cluster, row })
	}

	pub fn is_entity_valid(&mut self, entity: Entity) -> bool {
		self.storage.get_mut().locate(entity).is_some()
	}

	pub(crate) fn entity_allocator(&self) -> &EntityIdAllocator {
		&self.ids
	}

	/// Admits a new task into the schedule and blocks until every task it depends on is finished.
	/// Returns the task's job id and its dependencies.
	pub(crate) fn begin_job(&self, mode: TaskMode, reads: &[ComponentType], writes: &[ComponentType]) -> (JobId, Vec<JobId>) {
		let mut schedule = self.schedule.lock();
		let id = self.jobs.allocate_job_id();
		let dependencies = schedule.admit(&*self.jobs, id, mode, reads, writes);
		drop(schedule);

		tracing::debug!(job = id, ?mode, dependencies = dependencies.len(), "task admitted");

		for job in dependencies.iter() {
			self.jobs.wait_job(*job);
		}
		(id, dependencies)
	}

	pub(crate) fn finish_job(&self, id: JobId) {
		self.jobs.finish_job_id(id);
	}

	/// # Safety
	/// The caller must be inside an active task.
	pub(crate) unsafe fn storage(&self) -> &WorldStorage {
		&*self.storage.get()
	}

	/// # Safety
	/// The caller must be inside an active exclusive task and hold no other reference into the storage.
	#[allow(clippy::mut_from_ref)]
	pub(crate) unsafe fn storage_mut(&self) -> &mut WorldStorage {
		&mut *self.storage.get()
	}
}

impl Default for World {
	fn default() -> Self {
		Self::new()
	}
}
