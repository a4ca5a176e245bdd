use crate::components::{Component, ComponentId, ComponentType};
use crate::data_structures::AnyBuffer;
use crate::entities::{Entity, Tag};

/// A handle to a [Cluster] registered in a [World](crate::world::World).
#[derive(Default, Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone, Debug)]
pub struct ClusterId {
	pub(crate) index: u32,
}

impl ClusterId {
	#[inline(always)]
	pub const fn index(self) -> usize {
		self.index as usize
	}
}

/// A fixed-capacity block of rows within a [Cluster].
///
/// Holds a dense entity array and one densely packed column per component type of the cluster.
pub struct Chunk {
	entities: Vec<Entity>,
	columns: Box<[AnyBuffer]>,
}

impl Chunk {
	fn new(components: &[ComponentType], capacity: usize) -> Self {
		Self {
			entities: Vec::with_capacity(capacity),
			columns: components.iter().map(|t| AnyBuffer::with_capacity(*t, capacity)).collect(),
		}
	}

	/// Number of live rows in this chunk.
	#[inline(always)]
	pub fn len(&self) -> usize {
		self.entities.len()
	}

	#[inline(always)]
	pub fn is_empty(&self) -> bool {
		self.entities.is_empty()
	}

	/// The handles of the entities stored in this chunk, in row order.
	#[inline(always)]
	pub fn entities(&self) -> &[Entity] {
		&self.entities
	}

	/// The values of component `T` for every live row of this chunk,
	/// or `None` if the cluster does not contain `T`.
	pub(crate) fn column<T: Component>(&self) -> Option<&[T]> {
		let column = self.find_column(T::component_id())?;
		unsafe { Some(self.columns[column].as_slice::<T>(self.len())) }
	}

	/// The raw address of the column of component type `id`.
	/// Values are packed with a stride of the component's size.
	pub fn column_ptr(&self, id: ComponentId) -> Option<*const u8> {
		let column = self.find_column(id)?;
		Some(self.columns[column].ptr(0) as *const u8)
	}

	#[inline(always)]
	pub(crate) fn column_at(&self, column: usize) -> &AnyBuffer {
		&self.columns[column]
	}

	fn find_column(&self, id: ComponentId) -> Option<usize> {
		self.columns.binary_search_by_key(&id, |c| c.component_type().id()).ok()
	}
}

/// Stores every entity sharing one exact set of component types and tags.
///
/// Rows are split over fixed-capacity [chunks](Chunk) and are always packed in `[0, len)`:
/// freeing a row moves the last row into the hole.
pub struct Cluster {
	id: ClusterId,
	components: Box<[ComponentType]>,
	tags: Box<[Tag]>,
	chunk_capacity: usize,
	chunks: Vec<Chunk>,
	len: usize,
}

impl Cluster {
	/// `components` and `tags` must be sorted and free of duplicates.
	pub(crate) fn new(id: ClusterId, components: Vec<ComponentType>, tags: Vec<Tag>, chunk_capacity: usize) -> Self {
		debug_assert!(components.windows(2).all(|w| w[0] < w[1]));
		debug_assert!(tags.windows(2).all(|w| w[0] < w[1]));
		assert!(chunk_capacity > 0, "Chunk capacity must be at least 1");

		Self {
			id,
			components: components.into_boxed_slice(),
			tags: tags.into_boxed_slice(),
			chunk_capacity,
			chunks: Vec::new(),
			len: 0,
		}
	}

	#[inline(always)]
	pub fn id(&self) -> ClusterId {
		self.id
	}

	/// The component types of this cluster, sorted by id.
	#[inline(always)]
	pub fn components(&self) -> &[ComponentType] {
		&self.components
	}

	/// The tags of this cluster, sorted.
	#[inline(always)]
	pub fn tags(&self) -> &[Tag] {
		&self.tags
	}

	/// Number of entities stored in this cluster.
	#[inline(always)]
	pub fn len(&self) -> usize {
		self.len
	}

	#[inline(always)]
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn chunk_capacity(&self) -> usize {
		self.chunk_capacity
	}

	pub fn chunks(&self) -> &[Chunk] {
		&self.chunks
	}

	pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
		self.chunks.iter().flat_map(|c| c.entities.iter().copied())
	}

	pub fn entity(&self, row: usize) -> Entity {
		assert!(row < self.len, "Row {} is out of bounds", row);
		let (chunk, offset) = self.locate(row);
		self.chunks[chunk].entities[offset]
	}

	pub fn component_index(&self, id: ComponentId) -> Option<usize> {
		self.components.binary_search_by_key(&id, |t| t.id()).ok()
	}

	pub fn has_component(&self, id: ComponentId) -> bool {
		self.component_index(id).is_some()
	}

	pub fn has_tag(&self, tag: Tag) -> bool {
		self.tags.binary_search(&tag).is_ok()
	}

	/// Whether this cluster contains every one of `components` and `tags`.
	pub fn contains_all(&self, components: &[ComponentId], tags: &[Tag]) -> bool {
		components.iter().all(|c| self.has_component(*c)) && tags.iter().all(|t| self.has_tag(*t))
	}

	pub(crate) fn get_component<T: Component>(&self, row: usize) -> Option<&T> {
		assert!(row < self.len, "Row {} is out of bounds", row);
		let column = self.component_index(T::component_id())?;
		unsafe { Some(&*(self.component_ptr(column, row) as *const T)) }
	}

	/// The address of one component value.
	#[inline(always)]
	pub(crate) fn component_ptr(&self, column: usize, row: usize) -> *mut u8 {
		let (chunk, offset) = self.locate(row);
		self.chunks[chunk].columns[column].ptr(offset)
	}

	/// Appends a row for `entity` and default-constructs every component. Returns the new row.
	pub(crate) fn allocate_entry(&mut self, entity: Entity) -> usize {
		unsafe {
			let row = self.allocate_entry_uninit(entity);
			let (chunk, offset) = self.locate(row);
			for column in self.chunks[chunk].columns.iter() {
				column.construct(offset);
			}
			row
		}
	}

	/// Appends a row for `entity` without initializing its components.
	///
	/// # Safety
	/// Every component of the returned row must be initialized before the row is read, freed or dropped.
	pub(crate) unsafe fn allocate_entry_uninit(&mut self, entity: Entity) -> usize {
		if self.len == self.chunks.len() * self.chunk_capacity {
			self.chunks.push(Chunk::new(&self.components, self.chunk_capacity));
		}

		let row = self.len;
		let (chunk, _) = self.locate(row);
		self.chunks[chunk].entities.push(entity);
		self.len += 1;
		row
	}

	/// Destructs the components of `row` and fills the hole with the last row.
	/// Returns the handle of the entity that moved into `row`, if any.
	pub(crate) fn free_entry(&mut self, row: usize) -> Option<Entity> {
		unsafe { self.free_entry_except(row, &[]) }
	}

	/// Like [free_entry](Self::free_entry), but skips destructing the columns flagged in `moved`.
	///
	/// # Safety
	/// The values of the flagged columns at `row` must have been relocated out.
	pub(crate) unsafe fn free_entry_except(&mut self, row: usize, moved: &[bool]) -> Option<Entity> {
		assert!(row < self.len, "Row {} is out of bounds", row);

		let (chunk, offset) = self.locate(row);
		for (i, column) in self.chunks[chunk].columns.iter().enumerate() {
			if !moved.get(i).copied().unwrap_or(false) {
				column.destruct(offset);
			}
		}

		self.len -= 1;
		let last = self.len;
		let swapped = match row != last {
			true => Some(self.relocate_row(row, last)),
			false => None,
		};

		let tail = self.chunks.last_mut().expect("A live row always has a chunk");
		tail.entities.pop();
		if tail.entities.is_empty() {
			self.chunks.pop();
		}

		swapped
	}

	/// Destructs every entity of the cluster and releases its chunks.
	/// Returns the handles that were removed.
	pub(crate) fn free_all_entries(&mut self) -> Vec<Entity> {
		let entities = self.entities().collect();
		self.destruct_all();
		self.chunks.clear();
		self.len = 0;
		entities
	}

	/// Moves the handle and component values of `src` into the vacant row `dst`.
	unsafe fn relocate_row(&mut self, dst: usize, src: usize) -> Entity {
		let (dst_chunk, dst_offset) = self.locate(dst);
		let (src_chunk, src_offset) = self.locate(src);

		let entity = self.chunks[src_chunk].entities[src_offset];
		self.chunks[dst_chunk].entities[dst_offset] = entity;

		for column in 0..self.components.len() {
			let src = self.chunks[src_chunk].columns[column].ptr(src_offset);
			self.chunks[dst_chunk].columns[column].relocate_from(dst_offset, src);
		}

		entity
	}

	fn destruct_all(&mut self) {
		for chunk in self.chunks.iter() {
			for column in chunk.columns.iter().filter(|c| c.component_type().needs_drop()) {
				for offset in 0..chunk.len() {
					unsafe { column.destruct(offset) };
				}
			}
		}
	}

	#[inline(always)]
	fn locate(&self, row: usize) -> (usize, usize) {
		(row / self.chunk_capacity, row % self.chunk_capacity)
	}
}

impl Drop for Cluster {
	fn drop(&mut self) {
		self.destruct_all();
	}
}
