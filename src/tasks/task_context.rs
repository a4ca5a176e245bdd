use crate::clusters::{Chunk, Cluster, ClusterId};
use crate::components::{Component, ComponentId, ComponentType};
use crate::entities::{Entity, EntityAddress, Tag};
use crate::error::{EcsError, EcsResult};
use crate::jobs::{JobId, INVALID_JOB_ID};
use crate::resolver::EntityResolver;
use crate::tasks::{ChangeList, ChangeOp, Query, TaskMode};
use crate::world::World;
use rayon::prelude::{IntoParallelIterator, ParallelIterator};
use nohash_hasher::{IntMap, IntSet};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum TaskState {
	NotStarted,
	Active,
	Ended,
}

/// The handle a unit of work uses to read and modify a [World].
///
/// A task is opened with [begin](TaskContext::begin), which blocks until every conflicting task has finished,
/// and closed with [end](TaskContext::end). Structural changes (adding and removing entities, components and tags)
/// are buffered in a change list and applied when the task ends, at most one cluster move per entity.
/// A context can be reused for any number of consecutive tasks.
pub struct TaskContext<'w> {
	world: &'w World,
	state: TaskState,
	mode: TaskMode,
	job: JobId,
	dependencies: Vec<JobId>,
	reads: IntSet<ComponentId>,
	writes: IntSet<ComponentId>,
	target: Option<Entity>,
	changes: ChangeList,
}

impl<'w> TaskContext<'w> {
	pub fn new(world: &'w World) -> Self {
		Self {
			world,
			state: TaskState::NotStarted,
			mode: TaskMode::Exclusive,
			job: INVALID_JOB_ID,
			dependencies: Vec::new(),
			reads: IntSet::default(),
			writes: IntSet::default(),
			target: None,
			changes: ChangeList::default(),
		}
	}

	/// Begins a new task, blocking until it can safely run.
	///
	/// Shared tasks declare the component types they read and write; `writes` implies read access.
	/// Exclusive tasks ignore both and access everything.
	pub fn begin(&mut self, mode: TaskMode, reads: &[ComponentType], writes: &[ComponentType]) {
		assert!(self.state != TaskState::Active, "Task has already begun, call end() first");

		let (job, dependencies) = self.world.begin_job(mode, reads, writes);
		self.state = TaskState::Active;
		self.mode = mode;
		self.job = job;
		self.dependencies = dependencies;
		self.reads = reads.iter().map(|t| t.id()).collect();
		self.writes = writes.iter().map(|t| t.id()).collect();
	}

	/// Finishes the task and applies its structural changes.
	///
	/// Changes of a shared task are committed by a new exclusive task opened after this one finishes,
	/// so this call may block.
	pub fn end(&mut self) {
		assert!(self.state == TaskState::Active, "Task was never begun");

		if self.changes.is_empty() {
			self.world.finish_job(self.job);
		} else {
			match self.mode {
				TaskMode::Exclusive => {
					self.apply_change_list();
					self.world.finish_job(self.job);
				},

				TaskMode::Shared => {
					self.world.finish_job(self.job);
					let (commit, _) = self.world.begin_job(TaskMode::Exclusive, &[], &[]);
					tracing::debug!(job = self.job, commit, "committing structural changes of shared task");
					self.apply_change_list();
					self.world.finish_job(commit);
				},
			}
		}

		self.changes.reset();
		self.target = None;
		self.state = TaskState::Ended;
	}

	pub fn world(&self) -> &'w World {
		self.world
	}

	pub fn mode(&self) -> TaskMode {
		self.mode
	}

	pub fn is_active(&self) -> bool {
		self.state == TaskState::Active
	}

	/// The job id of the current (or last) task.
	pub fn job_id(&self) -> JobId {
		self.job
	}

	/// The jobs the current (or last) task waited for in [begin](Self::begin).
	pub fn dependencies(&self) -> &[JobId] {
		&self.dependencies
	}

	/// Resolves the current address of an entity.
	/// Entities added by this task are not found until the task ends.
	pub fn get_entity(&self, entity: Entity) -> EcsResult<EntityAddress<'_>> {
		let (cluster, row) = self.storage().address(entity)?;
		Ok(EntityAddress { cluster, row })
	}

	pub fn is_entity_valid(&self, entity: Entity) -> bool {
		self.get_entity(entity).is_ok()
	}

	pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
		match self.get_entity(entity) {
			Ok(address) => address.cluster.has_component(T::component_id()),
			Err(_) => false,
		}
	}

	pub fn get_component<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
		self.check_access::<T>(false);
		let (cluster, row) = self.component_location::<T>(entity)?;
		unsafe { Ok(&*(cluster.component_ptr(row.0, row.1) as *const T)) }
	}

	pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
		self.check_access::<T>(true);
		let (cluster, row) = self.component_location::<T>(entity)?;
		unsafe { Ok(&mut *(cluster.component_ptr(row.0, row.1) as *mut T)) }
	}

	/// The values of component `T` for every row of `chunk`,
	/// or `None` if the chunk's cluster does not contain `T`.
	pub fn column<'c, T: Component>(&self, chunk: &'c Chunk) -> Option<&'c [T]> {
		self.assert_active();
		self.check_access::<T>(false);
		chunk.column::<T>()
	}

	pub fn cluster(&self, id: ClusterId) -> &Cluster {
		self.storage().cluster(id)
	}

	/// Every cluster accepted by `predicate`.
	pub fn get_clusters(&self, mut predicate: impl FnMut(&Cluster) -> bool) -> Vec<&Cluster> {
		self.storage().clusters().filter(|c| predicate(*c)).collect()
	}

	/// Every cluster containing all of `components` and `tags`.
	pub fn get_clusters_with(&self, components: &[ComponentType], tags: &[Tag]) -> Vec<&Cluster> {
		let components: Vec<ComponentId> = components.iter().map(|t| t.id()).collect();
		self.get_clusters(|c| c.contains_all(&components, tags))
	}

	/// Calls `func` for every entity holding all components of `Q`.
	pub fn for_each<'s, Q: Query>(&'s mut self, mut func: impl FnMut(Entity, Q::Item<'s>)) {
		for view in self.plan_query::<Q>() {
			let entities = unsafe { std::slice::from_raw_parts(view.entities, view.len) };
			for (row, entity) in entities.iter().enumerate() {
				func(*entity, unsafe { Q::fetch(&view.columns, row) });
			}
		}
	}

	/// Like [for_each](Self::for_each), with chunks processed in parallel.
	pub fn par_for_each<'s, Q: Query>(&'s mut self, func: impl Fn(Entity, Q::Item<'s>) + Send + Sync) {
		self.plan_query::<Q>().into_par_iter().for_each(|view| {
			let entities = unsafe { std::slice::from_raw_parts(view.entities, view.len) };
			for (row, entity) in entities.iter().enumerate() {
				func(*entity, unsafe { Q::fetch(&view.columns, row) });
			}
		});
	}

	/// Reserves a new entity. It is created, with no components or tags, when the change list is applied.
	pub fn add_entity(&mut self) -> Entity {
		self.assert_active();
		let entity = self.world.entity_allocator().allocate();
		self.changes.push(ChangeOp::AddEntity(entity));
		entity
	}

	/// Removes an entity. Does nothing if the entity no longer exists when the change list is applied.
	pub fn remove_entity(&mut self, entity: Entity) {
		self.assert_active();
		self.changes.push(ChangeOp::RemoveEntity(entity));
	}

	pub fn remove_all_entities(&mut self) {
		self.assert_active();
		self.changes.push(ChangeOp::RemoveAllEntities);
	}

	/// Selects the entity that subsequent component and tag edits apply to.
	pub fn set_target_entity(&mut self, entity: Entity) {
		self.assert_active();
		self.target = Some(entity);
		self.changes.push(ChangeOp::SetTargetEntity(entity));
	}

	/// Adds a component to the target entity, overwriting the value if the component is already present.
	/// Returns the index of the staged value, see [temp_component_mut](Self::temp_component_mut).
	pub fn add_component<T: Component>(&mut self, value: T) -> usize {
		self.stage_component(value, false)
	}

	/// Adds a component to the target entity unless it is already present (or already added by this task).
	pub fn add_component_if_absent<T: Component>(&mut self, value: T) -> usize {
		self.stage_component(value, true)
	}

	/// Adds a default-constructed component of a runtime-described type to the target entity.
	pub fn add_component_default(&mut self, component: ComponentType, only_if_absent: bool) -> usize {
		self.assert_target();
		let index = self.changes.stage_default(component);
		self.changes.push(ChangeOp::AddComponent { component, index, only_if_absent });
		index
	}

	/// A component value staged by this task, still editable until the change list is applied.
	pub fn temp_component_mut<T: Component>(&mut self, index: usize) -> Option<&mut T> {
		self.changes.staged_mut::<T>(index)
	}

	pub fn remove_component<T: Component>(&mut self) {
		self.remove_component_type(ComponentType::of::<T>());
	}

	pub fn remove_component_type(&mut self, component: ComponentType) {
		self.assert_target();
		self.changes.push(ChangeOp::RemoveComponent(component));
	}

	pub fn remove_all_components(&mut self) {
		self.assert_target();
		self.changes.push(ChangeOp::RemoveAllComponents);
	}

	pub fn add_tag(&mut self, tag: impl Into<Tag>) {
		self.assert_target();
		self.changes.push(ChangeOp::AddTag(tag.into()));
	}

	pub fn remove_tag(&mut self, tag: impl Into<Tag>) {
		self.assert_target();
		self.changes.push(ChangeOp::RemoveTag(tag.into()));
	}

	pub fn remove_all_tags(&mut self) {
		self.assert_target();
		self.changes.push(ChangeOp::RemoveAllTags);
	}

	fn stage_component<T: Component>(&mut self, value: T, only_if_absent: bool) -> usize {
		self.assert_target();
		let (component, index) = self.changes.stage(value);
		self.changes.push(ChangeOp::AddComponent { component, index, only_if_absent });
		index
	}

	/// Replays the change list: one resolver per touched entity, each applied once at the end.
	fn apply_change_list(&mut self) {
		// SAFETY: only called while this context holds an exclusive job.
		let storage = unsafe { self.world.storage_mut() };
		let ids = self.world.entity_allocator();

		let mut resolvers: Vec<(Entity, EntityResolver)> = Vec::new();
		let mut lookup: IntMap<Entity, usize> = IntMap::default();
		let mut current: Option<usize> = None;

		for op in self.changes.take_ops() {
			match op {
				ChangeOp::AddEntity(entity) => storage.add_entity_record(entity, storage.clusters.empty()),

				ChangeOp::RemoveEntity(entity) => {
					storage.remove_entity(ids, entity);
				},

				ChangeOp::RemoveAllEntities => {
					storage.remove_all_entities(ids);
				},

				ChangeOp::SetTargetEntity(entity) => {
					current = match lookup.get(&entity) {
						Some(index) => Some(*index),
						None => match storage.address(entity) {
							Ok((cluster, _)) => {
								resolvers.push((entity, EntityResolver::new(cluster)));
								lookup.insert(entity, resolvers.len() - 1);
								Some(resolvers.len() - 1)
							},
							Err(_) => {
								tracing::warn!(%entity, "change list targets an invalid entity, its edits are ignored");
								None
							},
						},
					};
				},

				ChangeOp::AddComponent { component, index, only_if_absent } => {
					if let Some(i) = current {
						let resolver = &mut resolvers[i].1;
						let added = resolver.add_component(component);
						if added || !only_if_absent {
							resolver.set_override(component.id(), index);
						}
					}
				},

				ChangeOp::RemoveComponent(component) => {
					if let Some(i) = current {
						let resolver = &mut resolvers[i].1;
						resolver.remove_component(component.id());
					}
				},

				ChangeOp::RemoveAllComponents => {
					if let Some(i) = current {
						let resolver = &mut resolvers[i].1;
						resolver.remove_all_components();
					}
				},

				ChangeOp::AddTag(tag) => {
					if let Some(i) = current {
						let resolver = &mut resolvers[i].1;
						resolver.add_tag(tag);
					}
				},

				ChangeOp::RemoveTag(tag) => {
					if let Some(i) = current {
						let resolver = &mut resolvers[i].1;
						resolver.remove_tag(tag);
					}
				},

				ChangeOp::RemoveAllTags => {
					if let Some(i) = current {
						let resolver = &mut resolvers[i].1;
						resolver.remove_all_tags();
					}
				},
			}
		}

		for (entity, resolver) in resolvers {
			resolver.apply(storage, entity, &mut self.changes);
		}
	}

	/// Collects the chunks a query visits, after checking the query against the declared accesses.
	fn plan_query<Q: Query>(&self) -> Vec<ChunkView> {
		let accesses = Q::accesses();
		for (i, (component, write)) in accesses.iter().enumerate() {
			self.check_access_id(component.id(), component.name(), *write);
			let aliased = accesses[..i].iter().any(|(other, other_write)| other == component && (*write || *other_write));
			assert!(!aliased, "Query accesses component {} mutably more than once", component.name());
		}

		let mut views = Vec::new();
		for cluster in self.storage().clusters() {
			let columns: Option<Vec<usize>> = accesses.iter().map(|(t, _)| cluster.component_index(t.id())).collect();
			let columns = match columns {
				Some(columns) if !cluster.is_empty() => columns,
				_ => continue,
			};

			for chunk in cluster.chunks() {
				views.push(ChunkView {
					entities: chunk.entities().as_ptr(),
					len: chunk.len(),
					columns: columns.iter().map(|c| chunk.column_at(*c).ptr(0)).collect(),
				});
			}
		}
		views
	}

	fn component_location<T: Component>(&self, entity: Entity) -> EcsResult<(&Cluster, (usize, usize))> {
		let (cluster, row) = self.storage().address(entity)?;
		match cluster.component_index(T::component_id()) {
			Some(column) => Ok((cluster, (column, row))),
			None => Err(EcsError::ComponentNotFound {
				entity,
				component: std::any::type_name::<T>(),
			}),
		}
	}

	fn storage(&self) -> &crate::world::WorldStorage {
		self.assert_active();
		// SAFETY: no structural change can run while this task is active.
		unsafe { self.world.storage() }
	}

	fn check_access<T: Component>(&self, write: bool) {
		self.check_access_id(T::component_id(), std::any::type_name::<T>(), write);
	}

	fn check_access_id(&self, component: ComponentId, name: &str, write: bool) {
		if self.mode == TaskMode::Exclusive {
			return;
		}

		let allowed = match write {
			true => self.writes.contains(&component),
			false => self.reads.contains(&component) || self.writes.contains(&component),
		};
		assert_access(allowed, name, write);
	}

	fn assert_active(&self) {
		assert!(self.state == TaskState::Active, "Task is not active, call begin() first");
	}

	fn assert_target(&self) {
		self.assert_active();
		assert!(self.target.is_some(), "No target entity, call set_target_entity() first");
	}
}

impl Drop for TaskContext<'_> {
	fn drop(&mut self) {
		if self.state == TaskState::Active && !std::thread::panicking() {
			panic!("Task context dropped while its task was still active, call end() first");
		}
	}
}

/// The rows of one chunk a query visits.
struct ChunkView {
	entities: *const Entity,
	len: usize,
	columns: Vec<*mut u8>,
}

// SAFETY: views of distinct chunks never overlap, and component types are `Send + Sync`.
unsafe impl Send for ChunkView {}

#[inline(always)]
fn assert_access(allowed: bool, component: &str, write: bool) {
	#[cfg(not(feature = "debug_only_assertions"))]
	assert!(allowed, "Shared task did not declare {} access to {}", if write { "write" } else { "read" }, component);

	#[cfg(feature = "debug_only_assertions")]
	debug_assert!(allowed, "Shared task did not declare {} access to {}", if write { "write" } else { "read" }, component);
}
