use crate::clusters::{Cluster, ClusterId};
use crate::components::{sorted_set, Component};
use crate::component_types;
use crate::entities::Entity;
use crate::tests::{drops, Health, Position, Tracked};
use rand::{thread_rng, Rng};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

fn new_cluster(chunk_capacity: usize) -> Cluster {
	Cluster::new(ClusterId::default(), sorted_set(&component_types![Position, Health]), vec![], chunk_capacity)
}

fn set_health(cluster: &Cluster, row: usize, value: u32) {
	let column = cluster.component_index(Health::component_id()).unwrap();
	unsafe { *(cluster.component_ptr(column, row) as *mut Health) = Health(value) };
}

#[test]
fn rows_stay_packed_under_random_edits() {
	let mut rng = thread_rng();
	let mut cluster = new_cluster(4);
	let mut expected: Vec<Entity> = Vec::new();
	let mut next = 0;

	for _ in 0..1000 {
		if expected.is_empty() || rng.gen_bool(0.55) {
			let entity = Entity::new(next, 1);
			next += 1;

			let row = cluster.allocate_entry(entity);
			assert_eq!(row, expected.len(), "New rows must be appended");
			assert_eq!(cluster.get_component::<Health>(row), Some(&Health(0)));
			set_health(&cluster, row, entity.index());
			expected.push(entity);
		} else {
			let row = rng.gen_range(0..expected.len());
			let swapped = cluster.free_entry(row);
			expected.swap_remove(row);
			assert_eq!(swapped, expected.get(row).copied(), "Freeing must report the entity moved into the hole");
		}

		assert_eq!(cluster.len(), expected.len());
		assert_eq!(cluster.chunks().len(), (expected.len() + 3) / 4);
		for (row, entity) in expected.iter().enumerate() {
			assert_eq!(cluster.entity(row), *entity);
			assert_eq!(cluster.get_component::<Health>(row), Some(&Health(entity.index())));
		}
	}
}

#[test]
fn freeing_the_only_row_reports_no_move() {
	let mut cluster = new_cluster(4);
	cluster.allocate_entry(Entity::new(0, 1));

	assert_eq!(cluster.free_entry(0), None);
	assert!(cluster.is_empty());
	assert!(cluster.chunks().is_empty());
}

#[test]
fn freeing_the_last_row_reports_no_move() {
	let mut cluster = new_cluster(4);
	cluster.allocate_entry(Entity::new(0, 1));
	cluster.allocate_entry(Entity::new(1, 1));

	assert_eq!(cluster.free_entry(1), None);
	assert_eq!(cluster.free_entry(0), None);
	assert_eq!(cluster.len(), 0);
}

#[test]
fn chunks_are_filled_in_order() {
	let mut cluster = new_cluster(2);
	for i in 0..5 {
		let row = cluster.allocate_entry(Entity::new(i, 1));
		set_health(&cluster, row, i * 10);
	}

	let lens: Vec<usize> = cluster.chunks().iter().map(|c| c.len()).collect();
	assert_eq!(lens, [2, 2, 1]);

	let third = &cluster.chunks()[2];
	assert_eq!(third.entities(), &[Entity::new(4, 1)]);
	assert_eq!(third.column::<Health>(), Some([Health(40)].as_slice()));
	assert!(third.column::<crate::tests::Velocity>().is_none());
	assert!(third.column_ptr(Position::component_id()).is_some());
}

#[test]
fn values_are_dropped_once() {
	let counter = Arc::new(AtomicUsize::new(0));
	let components = sorted_set(&component_types![Tracked, Health]);
	let tracked = components.iter().position(|t| t.id() == Tracked::component_id()).unwrap();

	let mut cluster = Cluster::new(ClusterId::default(), components, vec![], 2);
	for i in 0..5 {
		let row = cluster.allocate_entry(Entity::new(i, 1));
		unsafe { *(cluster.component_ptr(tracked, row) as *mut Tracked) = Tracked::new(&counter, i) };
	}
	assert_eq!(drops(&counter), 0, "Default values hold no counter");

	cluster.free_entry(1);
	assert_eq!(drops(&counter), 1);

	let removed = cluster.free_all_entries();
	assert_eq!(removed.len(), 4);
	assert_eq!(drops(&counter), 5);

	let row = cluster.allocate_entry(Entity::new(9, 1));
	unsafe { *(cluster.component_ptr(tracked, row) as *mut Tracked) = Tracked::new(&counter, 9) };
	drop(cluster);
	assert_eq!(drops(&counter), 6);
}

#[test]
fn zero_sized_components_take_no_space() {
	let mut cluster = Cluster::new(ClusterId::default(), component_types![crate::tests::Frozen].to_vec(), vec![], 4);
	for i in 0..9 {
		cluster.allocate_entry(Entity::new(i, 1));
	}
	cluster.free_entry(3);
	assert_eq!(cluster.len(), 8);
	assert_eq!(cluster.entity(3), Entity::new(8, 1));
}
