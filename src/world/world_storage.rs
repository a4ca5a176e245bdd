use crate::clusters::{Cluster, ClusterId, ClusterRegistry};
use crate::components::{sorted_set, ComponentId, ComponentType};
use crate::entities::{assert_entity, Entity, EntityIdAllocator, EntityRecord, Tag};
use crate::error::{EcsError, EcsResult};
use std::cmp::Ordering;

/// The entity directory and every cluster of a world.
///
/// Only mutated while the caller holds exclusive access to the world.
pub(crate) struct WorldStorage {
	records: Vec<EntityRecord>,
	pub(crate) clusters: ClusterRegistry,
}

impl WorldStorage {
	pub fn new(chunk_capacity: usize, entity_capacity: usize) -> Self {
		Self {
			records: Vec::with_capacity(entity_capacity),
			clusters: ClusterRegistry::new(chunk_capacity),
		}
	}

	/// The cluster and row of a live entity.
	pub fn locate(&self, entity: Entity) -> Option<(ClusterId, usize)> {
		let record = self.records.get(entity.index() as usize)?;
		if record.generation != entity.generation() {
			return None;
		}
		record.cluster.map(|cluster| (cluster, record.row))
	}

	pub fn address(&self, entity: Entity) -> EcsResult<(&Cluster, usize)> {
		match self.locate(entity) {
			Some((cluster, row)) => Ok((self.clusters.get(cluster), row)),
			None => Err(EcsError::EntityNotFound(entity)),
		}
	}

	/// Finds the canonical cluster for a set of components and tags, in any order.
	pub fn get_cluster(&mut self, components: &[ComponentType], tags: &[Tag], create_if_absent: bool) -> Option<ClusterId> {
		let components = sorted_set(components);
		let tags = sorted_set(tags);
		match create_if_absent {
			true => Some(self.clusters.get_or_create(&components, &tags)),
			false => self.clusters.find(&components, &tags),
		}
	}

	/// Stores a freshly allocated handle in `cluster` with default-constructed components.
	pub fn add_entity_record(&mut self, entity: Entity, cluster: ClusterId) {
		let index = entity.index() as usize;
		if index >= self.records.len() {
			self.records.resize(index + 1, EntityRecord::default());
		}
		assert_entity(self.records[index].cluster.is_none(), "Entity slot is already in use");

		let row = self.clusters.get_mut(cluster).allocate_entry(entity);
		self.records[index] = EntityRecord {
			cluster: Some(cluster),
			row,
			generation: entity.generation(),
		};
	}

	/// Destroys a live entity. Returns `false` without effect if the handle is not live.
	pub fn remove_entity(&mut self, ids: &EntityIdAllocator, entity: Entity) -> bool {
		let (cluster, row) = match self.locate(entity) {
			Some(location) => location,
			None => {
				tracing::warn!(%entity, "remove_entity: invalid entity, the call takes no effect");
				return false;
			},
		};

		let swapped = self.clusters.get_mut(cluster).free_entry(row);
		self.patch_swapped(swapped, row);
		self.records[entity.index() as usize].cluster = None;
		ids.free(entity);
		true
	}

	/// Destroys every entity of one cluster. The cluster itself stays registered.
	pub fn remove_cluster_entities(&mut self, ids: &EntityIdAllocator, cluster: ClusterId) -> usize {
		let removed = self.clusters.get_mut(cluster).free_all_entries();
		for entity in removed.iter() {
			self.records[entity.index() as usize].cluster = None;
			ids.free(*entity);
		}
		removed.len()
	}

	pub fn remove_all_entities(&mut self, ids: &EntityIdAllocator) -> usize {
		let clusters = (0..self.clusters.len() as u32).map(|index| ClusterId { index });
		clusters.map(|cluster| self.remove_cluster_entities(ids, cluster)).sum()
	}

	/// Moves a live entity into `dst`.
	///
	/// Component types are diffed as two sorted lists. For every destination type the value comes from
	/// `take_override` if it yields one, else from the source row, else from default construction.
	/// Source-only types are destructed when the source row is freed.
	pub fn relocate(
		&mut self, entity: Entity, dst: ClusterId, mut take_override: impl FnMut(ComponentId) -> Option<*mut u8>,
	) -> usize {
		let (src, src_row) = self.locate(entity).expect("Relocated entity must be live");
		debug_assert_ne!(src, dst);

		let (src_cluster, dst_cluster) = self.clusters.pair_mut(src, dst);
		let mut moved = vec![false; src_cluster.components().len()];

		let dst_row = unsafe {
			let dst_row = dst_cluster.allocate_entry_uninit(entity);
			let src_types = src_cluster.components();
			let dst_types = dst_cluster.components();

			let (mut s, mut d) = (0, 0);
			loop {
				let order = match (src_types.get(s), dst_types.get(d)) {
					(Some(a), Some(b)) => a.cmp(b),
					(Some(_), None) => Ordering::Less,
					(None, Some(_)) => Ordering::Greater,
					(None, None) => break,
				};

				match order {
					// Only in the source: dropped with the source row.
					Ordering::Less => s += 1,

					Ordering::Equal => {
						let ty = dst_types[d];
						let dst_ptr = dst_cluster.component_ptr(d, dst_row);
						match take_override(ty.id()) {
							Some(data) => ty.relocate(dst_ptr, data),
							None => {
								ty.relocate(dst_ptr, src_cluster.component_ptr(s, src_row));
								moved[s] = true;
							},
						}
						s += 1;
						d += 1;
					},

					Ordering::Greater => {
						let ty = dst_types[d];
						let dst_ptr = dst_cluster.component_ptr(d, dst_row);
						match take_override(ty.id()) {
							Some(data) => ty.relocate(dst_ptr, data),
							None => ty.construct(dst_ptr),
						}
						d += 1;
					},
				}
			}

			dst_row
		};

		let swapped = unsafe { src_cluster.free_entry_except(src_row, &moved) };
		self.patch_swapped(swapped, src_row);

		let record = &mut self.records[entity.index() as usize];
		record.cluster = Some(dst);
		record.row = dst_row;
		dst_row
	}

	pub fn cluster(&self, id: ClusterId) -> &Cluster {
		self.clusters.get(id)
	}

	pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
		self.clusters.iter()
	}

	fn patch_swapped(&mut self, swapped: Option<Entity>, row: usize) {
		if let Some(swapped) = swapped {
			self.records[swapped.index() as usize].row = row;
		}
	}
}
