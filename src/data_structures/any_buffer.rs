use crate::components::{Component, ComponentType};
use std::alloc::Layout;
use std::ptr::NonNull;

/// A fixed-capacity polymorphic container for items of the same component type.
/// The container does not keep track of which values stored within have been initialized,
/// nor will it automatically drop them upon destruction.
pub(crate) struct AnyBuffer {
	ptr: NonNull<u8>,
	capacity: usize,
	component_type: ComponentType,
}

// SAFETY: component types are required to be `Send + Sync`.
unsafe impl Send for AnyBuffer {}
unsafe impl Sync for AnyBuffer {}

impl AnyBuffer {
	pub fn with_capacity(component_type: ComponentType, capacity: usize) -> Self {
		Self {
			ptr: make_buffer(component_type.layout(), capacity),
			capacity,
			component_type,
		}
	}

	#[inline(always)]
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	#[inline(always)]
	pub fn component_type(&self) -> &ComponentType {
		&self.component_type
	}

	/// The address of `slot`. Valid for reads and writes for as long as the buffer lives.
	#[inline(always)]
	pub fn ptr(&self, slot: usize) -> *mut u8 {
		debug_assert!(slot < self.capacity || self.component_type.size() == 0);
		unsafe { self.ptr.as_ptr().add(slot * self.component_type.size()) }
	}

	/// # Safety
	/// The value at `slot` must be uninitialized.
	#[inline(always)]
	pub unsafe fn construct(&self, slot: usize) {
		self.component_type.construct(self.ptr(slot))
	}

	/// # Safety
	/// The value at `slot` must be initialized; it is uninitialized afterwards.
	#[inline(always)]
	pub unsafe fn destruct(&self, slot: usize) {
		self.component_type.destruct(self.ptr(slot))
	}

	/// Moves a value of this buffer's type from `src` into `slot`.
	///
	/// # Safety
	/// `slot` must be uninitialized and `src` must point to an initialized value
	/// of the same type that is not read again.
	#[inline(always)]
	pub unsafe fn relocate_from(&self, slot: usize, src: *const u8) {
		self.component_type.relocate(self.ptr(slot), src)
	}

	/// Grows the buffer, moving the first `len` values to the new allocation.
	pub fn grow(&mut self, capacity: usize, len: usize) {
		debug_assert!(len <= self.capacity);
		if capacity <= self.capacity {
			return;
		}

		let layout = self.component_type.layout();
		let buffer = make_buffer(layout, capacity);
		unsafe {
			std::ptr::copy_nonoverlapping(self.ptr.as_ptr(), buffer.as_ptr(), len * layout.size());
			free_buffer(self.ptr, layout, self.capacity);
		}

		self.ptr = buffer;
		self.capacity = capacity;
	}

	/// # Safety
	/// The first `len` values must be initialized.
	pub unsafe fn as_slice<T: Component>(&self, len: usize) -> &[T] {
		self.assert_type::<T>();
		std::slice::from_raw_parts(self.ptr.as_ptr() as *const T, len)
	}

	#[inline(always)]
	pub fn assert_type<T: Component>(&self) {
		assert_eq!(
			self.component_type.id(),
			T::component_id(),
			"Buffer does not contain elements of type T"
		);
	}
}

impl Drop for AnyBuffer {
	fn drop(&mut self) {
		unsafe { free_buffer(self.ptr, self.component_type.layout(), self.capacity) }
	}
}

fn array_layout(layout: Layout, count: usize) -> Layout {
	let bytes = layout.size().checked_mul(count).expect("buffer size overflow");
	Layout::from_size_align(bytes, layout.align()).expect("invalid buffer layout")
}

fn make_buffer(layout: Layout, count: usize) -> NonNull<u8> {
	let layout = array_layout(layout, count);
	if layout.size() == 0 {
		// Zero-sized allocations are never dereferenced, any aligned non-null address will do.
		return unsafe { NonNull::new_unchecked(layout.align() as *mut u8) };
	}

	let ptr = unsafe { std::alloc::alloc(layout) };
	match NonNull::new(ptr) {
		Some(ptr) => ptr,
		None => std::alloc::handle_alloc_error(layout),
	}
}

unsafe fn free_buffer(ptr: NonNull<u8>, layout: Layout, count: usize) {
	let layout = array_layout(layout, count);
	if layout.size() != 0 {
		std::alloc::dealloc(ptr.as_ptr(), layout);
	}
}
