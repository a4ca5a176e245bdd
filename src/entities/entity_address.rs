use crate::clusters::Cluster;

/// The current location of an entity.
/// Addresses change whenever structural changes are applied to the world.
#[derive(Copy, Clone)]
pub struct EntityAddress<'l> {
	/// The cluster the entity belongs to.
	pub cluster: &'l Cluster,
	/// The entity's row within the cluster.
	pub row: usize,
}
