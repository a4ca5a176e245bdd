use crate::components::{Component, ComponentId, ComponentType};
use crate::data_structures::StagingBuffer;
use crate::entities::{Entity, Tag};
use nohash_hasher::IntMap;

/// One buffered structural edit.
#[derive(Copy, Clone, Debug)]
pub(crate) enum ChangeOp {
	AddEntity(Entity),
	RemoveEntity(Entity),
	RemoveAllEntities,
	/// Retargets every following component and tag edit.
	SetTargetEntity(Entity),
	/// `index` refers to the value staged for `component`.
	AddComponent { component: ComponentType, index: usize, only_if_absent: bool },
	RemoveComponent(ComponentType),
	RemoveAllComponents,
	AddTag(Tag),
	RemoveTag(Tag),
	RemoveAllTags,
}

/// The structural edits of one task, applied in a single batch when the task ends.
#[derive(Default)]
pub(crate) struct ChangeList {
	ops: Vec<ChangeOp>,
	staged: IntMap<ComponentId, StagingBuffer>,
}

impl ChangeList {
	pub fn is_empty(&self) -> bool {
		self.ops.is_empty()
	}

	pub fn push(&mut self, op: ChangeOp) {
		self.ops.push(op);
	}

	/// Stages `value` and returns its index.
	pub fn stage<T: Component>(&mut self, value: T) -> (ComponentType, usize) {
		let component = ComponentType::of::<T>();
		let index = self.buffer(component).push(value);
		(component, index)
	}

	/// Stages a default-constructed value and returns its index.
	pub fn stage_default(&mut self, component: ComponentType) -> usize {
		self.buffer(component).push_default()
	}

	pub fn staged_mut<T: Component>(&mut self, index: usize) -> Option<&mut T> {
		self.staged.get_mut(&T::component_id())?.get_mut::<T>(index)
	}

	/// Transfers ownership of a staged value to the caller.
	pub fn take_staged(&mut self, component: ComponentId, index: usize) -> *mut u8 {
		let buffer = self.staged.get_mut(&component).expect("Change list refers to a component that was never staged");
		buffer.take(index)
	}

	/// Hands out the buffered edits in issue order.
	pub fn take_ops(&mut self) -> Vec<ChangeOp> {
		std::mem::take(&mut self.ops)
	}

	/// Drops every edit and every staged value that was not consumed.
	pub fn reset(&mut self) {
		self.ops.clear();
		self.staged.clear();
	}

	fn buffer(&mut self, component: ComponentType) -> &mut StagingBuffer {
		let buffer = self.staged.entry(component.id()).or_insert_with(|| StagingBuffer::new(component));
		debug_assert_eq!(buffer.component_type().layout(), component.layout());
		buffer
	}
}
