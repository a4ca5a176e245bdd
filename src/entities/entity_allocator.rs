use crate::entities::Entity;
use std::collections::VecDeque;
use parking_lot::Mutex;

/// Hands out [entity](Entity) handles and recycles freed indices.
///
/// Guarded by its own lock so shared tasks can reserve handles without exclusive access to the world.
/// Indices are recycled first in, first out; generations start at 1, so no live handle is ever [`Entity::NULL`].
#[derive(Default)]
pub struct EntityIdAllocator {
	inner: Mutex<AllocatorState>,
}

#[derive(Default)]
struct AllocatorState {
	free: VecDeque<Entity>,
	next_index: u32,
}

impl EntityIdAllocator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reserves a new handle.
	pub fn allocate(&self) -> Entity {
		let mut state = self.inner.lock();
		if let Some(freed) = state.free.pop_front() {
			return Entity::new(freed.index(), freed.generation().wrapping_add(1).max(1));
		}

		let index = state.next_index;
		state.next_index = index.checked_add(1).expect("entity index space exhausted");
		Entity::new(index, 1)
	}

	/// Returns a handle's index to the pool. The next handle with this index gets a bumped generation.
	pub fn free(&self, entity: Entity) {
		self.inner.lock().free.push_back(entity);
	}

	/// Number of indices ever handed out.
	pub fn capacity(&self) -> usize {
		self.inner.lock().next_index as usize
	}
}
