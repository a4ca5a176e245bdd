use crate::clusters::{Cluster, ClusterId};
use crate::components::{ComponentId, ComponentType};
use crate::entities::Tag;
use std::collections::HashMap;

/// The canonical identity of a [Cluster]: its sorted component ids and sorted tags.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) struct ClusterSignature {
	components: Vec<ComponentId>,
	tags: Vec<Tag>,
}

impl ClusterSignature {
	/// `components` and `tags` must already be sorted and deduplicated.
	pub(crate) fn new(components: &[ComponentType], tags: &[Tag]) -> Self {
		Self {
			components: components.iter().map(|t| t.id()).collect(),
			tags: tags.to_vec(),
		}
	}
}

/// Owns every [Cluster] of a world and keeps exactly one per distinct signature.
pub(crate) struct ClusterRegistry {
	chunk_capacity: usize,
	clusters: Vec<Cluster>,
	map: HashMap<ClusterSignature, ClusterId>,
}

impl ClusterRegistry {
	pub fn new(chunk_capacity: usize) -> Self {
		let mut registry = Self {
			chunk_capacity,
			clusters: Vec::new(),
			map: HashMap::new(),
		};

		registry.get_or_create(&[], &[]);
		registry
	}

	/// The cluster of entities without components or tags.
	#[inline(always)]
	pub fn empty(&self) -> ClusterId {
		ClusterId::default()
	}

	/// `components` and `tags` must be sorted and deduplicated.
	pub fn find(&self, components: &[ComponentType], tags: &[Tag]) -> Option<ClusterId> {
		self.map.get(&ClusterSignature::new(components, tags)).copied()
	}

	/// `components` and `tags` must be sorted and deduplicated.
	#[inline(never)]
	pub fn get_or_create(&mut self, components: &[ComponentType], tags: &[Tag]) -> ClusterId {
		let signature = ClusterSignature::new(components, tags);
		if let Some(id) = self.map.get(&signature) {
			return *id;
		}

		let id = ClusterId {
			index: u32::try_from(self.clusters.len()).expect("cluster count exceeds u32"),
		};

		tracing::trace!(cluster = id.index, components = ?signature.components, tags = ?signature.tags, "registered cluster");

		self.clusters.push(Cluster::new(id, components.to_vec(), tags.to_vec(), self.chunk_capacity));
		self.map.insert(signature, id);
		id
	}

	#[inline(always)]
	pub fn get(&self, id: ClusterId) -> &Cluster {
		&self.clusters[id.index()]
	}

	#[inline(always)]
	pub fn get_mut(&mut self, id: ClusterId) -> &mut Cluster {
		&mut self.clusters[id.index()]
	}

	/// Borrows two distinct clusters mutably.
	pub fn pair_mut(&mut self, a: ClusterId, b: ClusterId) -> (&mut Cluster, &mut Cluster) {
		assert_ne!(a, b, "Cannot borrow the same cluster twice");
		let (a, b) = (a.index(), b.index());
		if a < b {
			let (left, right) = self.clusters.split_at_mut(b);
			(&mut left[a], &mut right[0])
		} else {
			let (left, right) = self.clusters.split_at_mut(a);
			(&mut right[0], &mut left[b])
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
		self.clusters.iter()
	}

	pub fn len(&self) -> usize {
		self.clusters.len()
	}
}
