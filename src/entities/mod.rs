//! [Entities](Entity) are lightweight handles into a [World](crate::world::World).

mod entity;
mod entity_address;
mod entity_allocator;

pub use entity::{Entity, Tag};
pub use entity_address::*;
pub use entity_allocator::*;

pub(crate) use entity::{assert_entity, EntityRecord};
