use crate::entities::{Entity, EntityIdAllocator, Tag};

#[test]
fn entity_packs_index_and_generation() {
	let entity = Entity::new(7, 3);
	assert_eq!(entity.index(), 7);
	assert_eq!(entity.generation(), 3);
	assert_eq!(Entity::from_bits(entity.to_bits()), entity);
	assert_eq!(entity.to_string(), "7v3");
	assert!(!entity.is_null());
	assert!(Entity::NULL.is_null());
	assert_eq!(Entity::default(), Entity::NULL);
}

#[test]
fn entity_converts_into_tag() {
	let entity = Entity::new(2, 1);
	assert_eq!(Tag::from(entity), Tag(entity.to_bits()));
}

#[test]
fn allocator_recycles_indices_in_order() {
	let ids = EntityIdAllocator::new();
	let a = ids.allocate();
	let b = ids.allocate();
	assert_eq!((a.index(), a.generation()), (0, 1));
	assert_eq!((b.index(), b.generation()), (1, 1));

	ids.free(b);
	ids.free(a);

	let c = ids.allocate();
	let d = ids.allocate();
	assert_eq!((c.index(), c.generation()), (1, 2));
	assert_eq!((d.index(), d.generation()), (0, 2));
	assert_eq!(ids.allocate().index(), 2);
	assert_eq!(ids.capacity(), 3);
}
