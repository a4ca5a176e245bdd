//! A unique runtime identifier tied to a [Component](crate::components::Component) type.
//!
//! Developers shouldn't rely on [component ids](ComponentId), as they are not stable between program re-runs.
//! Ids are handed out in increasing order, which gives every cluster signature a canonical sort order.

use std::sync::atomic::Ordering::Relaxed;
use std::sync::atomic::AtomicU32;
use std::fmt;

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

/// A globally unique identifier for a component type.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug)]
pub struct ComponentId {
	value: u32,
}

impl ComponentId {
	/// Generates a new [ComponentId].
	///
	/// Called once per type by #\[derive([Component](crate::components::Component))],
	/// or by hand when describing a component type at runtime.
	pub fn next() -> ComponentId {
		let value = NEXT_ID.fetch_add(1, Relaxed);
		assert_ne!(value, u32::MAX, "This is an insane number of components. Please seek help.");
		ComponentId { value }
	}

	#[inline(always)]
	pub const fn value(&self) -> u32 {
		self.value
	}
}

impl nohash_hasher::IsEnabled for ComponentId {}

impl fmt::Display for ComponentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.value)
	}
}
