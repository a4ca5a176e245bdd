use crate::components::{Component, ComponentType};
use crate::data_structures::AnyBuffer;

/// A growable polymorphic container holding component values staged by a change list.
///
/// Unlike [AnyBuffer], it tracks which of its values it still owns:
/// values [taken](StagingBuffer::take) by a relocation are not dropped again.
pub(crate) struct StagingBuffer {
	buffer: AnyBuffer,
	owned: Vec<bool>,
}

impl StagingBuffer {
	pub fn new(component_type: ComponentType) -> Self {
		Self {
			buffer: AnyBuffer::with_capacity(component_type, 0),
			owned: Vec::new(),
		}
	}

	pub fn component_type(&self) -> &ComponentType {
		self.buffer.component_type()
	}

	/// Stages a value and returns its index.
	pub fn push<T: Component>(&mut self, value: T) -> usize {
		self.buffer.assert_type::<T>();
		let index = self.reserve_one();
		unsafe { std::ptr::write(self.buffer.ptr(index) as *mut T, value) };
		self.owned.push(true);
		index
	}

	/// Stages a default-constructed value and returns its index.
	pub fn push_default(&mut self) -> usize {
		let index = self.reserve_one();
		unsafe { self.buffer.construct(index) };
		self.owned.push(true);
		index
	}

	pub fn get_mut<T: Component>(&mut self, index: usize) -> Option<&mut T> {
		self.buffer.assert_type::<T>();
		match self.owned.get(index) {
			Some(true) => unsafe { Some(&mut *(self.buffer.ptr(index) as *mut T)) },
			_ => None,
		}
	}

	/// Transfers ownership of the value at `index` to the caller.
	/// The returned pointer stays valid until the buffer is grown or dropped.
	pub fn take(&mut self, index: usize) -> *mut u8 {
		assert!(self.owned[index], "Staged component {} was already consumed", index);
		self.owned[index] = false;
		self.buffer.ptr(index)
	}

	fn reserve_one(&mut self) -> usize {
		let len = self.owned.len();
		if len == self.buffer.capacity() {
			self.buffer.grow(usize::max(len * 2, 1), len);
		}
		len
	}
}

impl Drop for StagingBuffer {
	fn drop(&mut self) {
		for (index, owned) in self.owned.iter().enumerate() {
			if *owned {
				unsafe { self.buffer.destruct(index) };
			}
		}
	}
}
