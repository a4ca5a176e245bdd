use crate::component_types;
use crate::components::{Component, ComponentType};
use crate::entities::Tag;
use crate::resolver::EntityResolver;
use crate::tasks::ChangeList;
use crate::tests::{Health, Position, Velocity};
use crate::world::World;

#[test]
fn resolver_tracks_sorted_sets() {
	let mut world = World::new();
	let cluster = world.get_cluster(&component_types![Velocity, Position], &[Tag(5)], true).unwrap();
	let mut resolver = EntityResolver::new(world.cluster(cluster));

	assert!(!resolver.add_component(ComponentType::of::<Position>()), "Already present");
	assert!(resolver.add_component(ComponentType::of::<Health>()));
	assert!(!resolver.add_component(ComponentType::of::<Health>()));
	assert!(resolver.components().windows(2).all(|w| w[0] < w[1]));
	assert_eq!(resolver.components().len(), 3);

	assert!(resolver.remove_component(Velocity::component_id()));
	assert!(!resolver.remove_component(Velocity::component_id()));

	assert!(resolver.add_tag(Tag(1)));
	assert!(!resolver.add_tag(Tag(1)));
	assert_eq!(resolver.tags(), &[Tag(1), Tag(5)]);
	assert!(resolver.remove_tag(Tag(5)));
	assert!(!resolver.remove_tag(Tag(5)));

	resolver.remove_all_components();
	resolver.remove_all_tags();
	assert!(resolver.components().is_empty());
	assert!(resolver.tags().is_empty());
}

#[test]
fn resolver_discards_edits_for_dead_entities() {
	let mut world = World::new();
	let entity = world.new_entity(world.empty_cluster());
	let mut resolver = EntityResolver::new(world.cluster(world.empty_cluster()));
	resolver.add_tag(Tag(1));
	world.delete_entity(entity);

	let mut changes = ChangeList::default();
	let storage = unsafe { world.storage_mut() };
	assert!(!resolver.apply(storage, entity, &mut changes));
	assert_eq!(storage.clusters.find(&[], &[Tag(1)]), None, "No cluster is created for discarded edits");
}

#[test]
fn resolver_moves_entity_with_staged_values() {
	let mut world = World::new();
	let entity = world.new_entity(world.empty_cluster());

	let mut changes = ChangeList::default();
	let (health, index) = changes.stage(Health(12));
	let mut resolver = EntityResolver::new(world.cluster(world.empty_cluster()));
	resolver.add_component(health);
	resolver.add_component(ComponentType::of::<Position>());
	resolver.set_override(health.id(), index);

	assert!(resolver.apply(unsafe { world.storage_mut() }, entity, &mut changes));
	changes.reset();

	let address = world.get_entity(entity).unwrap();
	assert_eq!(address.cluster.get_component::<Health>(address.row), Some(&Health(12)));
	assert_eq!(address.cluster.get_component::<Position>(address.row), Some(&Position::default()));
}
