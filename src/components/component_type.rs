use crate::components::ComponentId;
use std::hash::{Hash, Hasher};
use std::cmp::Ordering;
use std::alloc::Layout;
use std::fmt;

/// A runtime representation of a component type.
///
/// This is the type descriptor every column operation goes through:
/// storage never names concrete component types, it only calls through the
/// function table stored here.
#[derive(Copy, Clone)]
pub struct ComponentType {
	id: ComponentId,
	name: &'static str,
	layout: Layout,
	needs_drop: bool,
	construct: unsafe fn(*mut u8),
	destruct: unsafe fn(*mut u8),
}

impl ComponentType {
	/// Returns the [`ComponentType`] of T.
	pub fn of<T: Component>() -> Self {
		Self {
			id: T::component_id(),
			name: std::any::type_name::<T>(),
			layout: Layout::new::<T>(),
			needs_drop: std::mem::needs_drop::<T>(),
			construct: construct_default::<T>,
			destruct: drop_in_place::<T>,
		}
	}

	/// Describes a component type that only exists at runtime.
	///
	/// # Safety
	/// - `construct` must fully initialize `layout.size()` bytes at a pointer aligned to `layout.align()`.
	/// - `destruct` must accept any value produced by `construct` and leave the memory logically uninitialized.
	/// - Values must be movable with a plain byte copy.
	pub unsafe fn from_raw_parts(
		id: ComponentId, name: &'static str, layout: Layout,
		construct: unsafe fn(*mut u8), destruct: Option<unsafe fn(*mut u8)>,
	) -> Self {
		fn no_op(_: *mut u8) {}
		Self {
			id,
			name,
			layout,
			needs_drop: destruct.is_some(),
			construct,
			destruct: destruct.unwrap_or(no_op),
		}
	}

	#[inline(always)]
	pub const fn id(&self) -> ComponentId {
		self.id
	}

	pub const fn name(&self) -> &'static str {
		self.name
	}

	#[inline(always)]
	pub const fn size(&self) -> usize {
		self.layout.size()
	}

	#[inline(always)]
	pub const fn align(&self) -> usize {
		self.layout.align()
	}

	pub const fn layout(&self) -> Layout {
		self.layout
	}

	/// Whether [`destruct`](Self::destruct) has any effect.
	#[inline(always)]
	pub const fn needs_drop(&self) -> bool {
		self.needs_drop
	}

	/// # Safety
	/// `ptr` must be valid, aligned and uninitialized for this type.
	#[inline(always)]
	pub unsafe fn construct(&self, ptr: *mut u8) {
		(self.construct)(ptr)
	}

	/// # Safety
	/// `ptr` must hold an initialized value of this type; it is uninitialized afterwards.
	#[inline(always)]
	pub unsafe fn destruct(&self, ptr: *mut u8) {
		if self.needs_drop {
			(self.destruct)(ptr)
		}
	}

	/// Moves the value at `src` into `dst`. `src` is logically uninitialized afterwards.
	///
	/// # Safety
	/// `src` must hold an initialized value, `dst` must be uninitialized, and the two must not overlap.
	#[inline(always)]
	pub unsafe fn relocate(&self, dst: *mut u8, src: *const u8) {
		std::ptr::copy_nonoverlapping(src, dst, self.size())
	}
}

impl Eq for ComponentType {}

impl PartialEq<Self> for ComponentType {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Ord for ComponentType {
	fn cmp(&self, other: &Self) -> Ordering {
		self.id.cmp(&other.id)
	}
}

impl PartialOrd for ComponentType {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Hash for ComponentType {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state)
	}
}

impl fmt::Debug for ComponentType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentType").field("id", &self.id).field("name", &self.name).finish()
	}
}

/// A type that can be stored in a cluster column.
///
/// Implement it through #\[derive([`Component`])], which assigns the type a lazily allocated [`ComponentId`].
pub trait Component
where
	Self: 'static + Default + Send + Sync,
{
	fn component_id() -> ComponentId;
}

unsafe fn construct_default<T: Default>(ptr: *mut u8) {
	std::ptr::write(ptr as *mut T, T::default())
}

unsafe fn drop_in_place<T>(ptr: *mut u8) {
	std::ptr::drop_in_place(ptr as *mut T)
}

/// Normalizes a set of component types: sorted by id, duplicates removed.
pub(crate) fn sorted_set<T: Ord + Copy>(items: &[T]) -> Vec<T> {
	let mut items = items.to_vec();
	items.sort_unstable();
	items.dedup();
	items
}
