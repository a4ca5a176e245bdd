/// Construction parameters of a [World](crate::world::World).
#[derive(Clone, Debug)]
pub struct WorldConfig {
	/// Rows per chunk, shared by every cluster of the world.
	pub chunk_capacity: usize,
	/// Entity directory slots to reserve up front.
	pub entity_capacity: usize,
}

impl WorldConfig {
	pub const DEFAULT_CHUNK_CAPACITY: usize = 128;

	pub fn with_chunk_capacity(mut self, chunk_capacity: usize) -> Self {
		self.chunk_capacity = chunk_capacity;
		self
	}

	pub fn with_entity_capacity(mut self, entity_capacity: usize) -> Self {
		self.entity_capacity = entity_capacity;
		self
	}
}

impl Default for WorldConfig {
	fn default() -> Self {
		Self {
			chunk_capacity: Self::DEFAULT_CHUNK_CAPACITY,
			entity_capacity: 0,
		}
	}
}
