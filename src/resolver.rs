//! Folds the buffered edits made to one entity into a single move between clusters.

use crate::clusters::Cluster;
use crate::components::{ComponentId, ComponentType};
use crate::entities::{Entity, Tag};
use crate::tasks::ChangeList;
use crate::world::WorldStorage;
use nohash_hasher::IntMap;

/// The pending structural state of one entity within one change list.
///
/// Tracks the entity's target component types and tags as sorted sets, plus the staged value
/// each target component should take. Consumed by [apply](EntityResolver::apply).
pub(crate) struct EntityResolver {
	components: Vec<ComponentType>,
	tags: Vec<Tag>,
	overrides: IntMap<ComponentId, usize>,
}

impl EntityResolver {
	/// Starts from the entity's current cluster.
	pub fn new(cluster: &Cluster) -> Self {
		Self {
			components: cluster.components().to_vec(),
			tags: cluster.tags().to_vec(),
			overrides: IntMap::default(),
		}
	}

	#[cfg(test)]
	pub fn components(&self) -> &[ComponentType] {
		&self.components
	}

	#[cfg(test)]
	pub fn tags(&self) -> &[Tag] {
		&self.tags
	}

	/// Returns `true` if the target set changed.
	pub fn add_component(&mut self, component: ComponentType) -> bool {
		insert_sorted(&mut self.components, component)
	}

	/// Returns `true` if the target set changed. Drops any value staged for the component.
	pub fn remove_component(&mut self, component: ComponentId) -> bool {
		self.overrides.remove(&component);
		match self.components.binary_search_by_key(&component, |t| t.id()) {
			Ok(index) => {
				self.components.remove(index);
				true
			},
			Err(_) => false,
		}
	}

	pub fn remove_all_components(&mut self) {
		self.components.clear();
		self.overrides.clear();
	}

	/// Returns `true` if the target set changed.
	pub fn add_tag(&mut self, tag: Tag) -> bool {
		insert_sorted(&mut self.tags, tag)
	}

	/// Returns `true` if the target set changed.
	pub fn remove_tag(&mut self, tag: Tag) -> bool {
		match self.tags.binary_search(&tag) {
			Ok(index) => {
				self.tags.remove(index);
				true
			},
			Err(_) => false,
		}
	}

	pub fn remove_all_tags(&mut self) {
		self.tags.clear();
	}

	/// Makes the staged value `index` the one `component` takes on apply, replacing any earlier one.
	pub fn set_override(&mut self, component: ComponentId, index: usize) {
		self.overrides.insert(component, index);
	}

	/// Moves the entity into the cluster matching its target sets.
	///
	/// Edits against an entity that no longer exists are discarded. Returns whether the entity was live.
	pub fn apply(self, storage: &mut WorldStorage, entity: Entity, changes: &mut ChangeList) -> bool {
		let (src, row) = match storage.locate(entity) {
			Some(location) => location,
			None => {
				tracing::warn!(%entity, "change list targets an entity that no longer exists, its edits are discarded");
				return false;
			},
		};

		let dst = storage.clusters.get_or_create(&self.components, &self.tags);
		let overrides = self.overrides;

		if src != dst {
			storage.relocate(entity, dst, |component| {
				overrides.get(&component).map(|index| changes.take_staged(component, *index))
			});
			return true;
		}

		// Same cluster: staged values replace the stored ones.
		let cluster = storage.clusters.get(src);
		for (component, index) in overrides {
			let column = cluster.component_index(component).expect("Overridden component must be in the cluster");
			let ty = cluster.components()[column];
			let ptr = cluster.component_ptr(column, row);
			unsafe {
				ty.destruct(ptr);
				ty.relocate(ptr, changes.take_staged(component, index));
			}
		}
		true
	}
}

/// Sorted set insertion. Returns `true` if `value` was not present.
fn insert_sorted<T: Ord>(set: &mut Vec<T>, value: T) -> bool {
	match set.binary_search(&value) {
		Ok(_) => false,
		Err(index) => {
			set.insert(index, value);
			true
		},
	}
}
