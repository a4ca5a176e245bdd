use crate::clusters::ClusterId;
use std::hash::{Hash, Hasher};
use std::fmt;

/// A unique handle to an entity.
///
/// Packs a 32-bit index into the world's entity directory and a 32-bit generation,
/// which is bumped every time the index is reused so a stale handle never aliases a newer entity.
/// The all-zero value is [`Entity::NULL`].
#[derive(Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct Entity {
	value: u64,
}

impl Entity {
	/// The reserved null entity.
	pub const NULL: Entity = Entity { value: 0 };

	#[inline(always)]
	pub const fn new(index: u32, generation: u32) -> Self {
		Self {
			value: (generation as u64) << 32 | index as u64,
		}
	}

	#[inline(always)]
	pub const fn from_bits(value: u64) -> Self {
		Self { value }
	}

	#[inline(always)]
	pub const fn to_bits(self) -> u64 {
		self.value
	}

	#[inline(always)]
	pub const fn index(self) -> u32 {
		self.value as u32
	}

	#[inline(always)]
	pub const fn generation(self) -> u32 {
		(self.value >> 32) as u32
	}

	#[inline(always)]
	pub const fn is_null(self) -> bool {
		self.value == 0
	}
}

impl Hash for Entity {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_u64(self.value)
	}
}

impl nohash_hasher::IsEnabled for Entity {}

impl fmt::Debug for Entity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Entity({}v{})", self.index(), self.generation())
	}
}

impl fmt::Display for Entity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}v{}", self.index(), self.generation())
	}
}

/// An opaque identifier used to group and filter entities.
///
/// Any entity can serve as a tag, which lets entities be grouped under another entity.
#[derive(Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Tag(pub u64);

impl From<Entity> for Tag {
	fn from(entity: Entity) -> Self {
		Tag(entity.to_bits())
	}
}

/// The directory entry of an entity.
#[derive(Default, Copy, Clone, Debug)]
pub(crate) struct EntityRecord {
	/// `None` while the slot is free.
	pub cluster: Option<ClusterId>,
	pub row: usize,
	pub generation: u32,
}

#[inline(always)]
pub(crate) fn assert_entity(condition: bool, message: &str) {
	#[cfg(not(feature = "debug_only_assertions"))]
	assert!(condition, "{}", message);

	#[cfg(feature = "debug_only_assertions")]
	debug_assert!(condition, "{}", message);
}
