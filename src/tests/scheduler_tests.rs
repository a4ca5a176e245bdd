use crate::component_types;
use crate::jobs::{JobRegistry, JobSystem};
use crate::tasks::{ScheduleState, TaskContext, TaskMode};
use crate::tests::{Health, Position, Velocity};
use crate::world::World;
use std::sync::mpsc::channel;
use std::time::Duration;

#[test]
fn shared_tasks_wait_only_on_conflicts() {
	let jobs = JobRegistry::new();
	let mut schedule = ScheduleState::default();

	let a = jobs.allocate_job_id();
	let deps = schedule.admit(&jobs, a, TaskMode::Shared, &component_types![Position], &component_types![Velocity]);
	assert!(deps.is_empty());

	let b = jobs.allocate_job_id();
	let deps = schedule.admit(&jobs, b, TaskMode::Shared, &component_types![Position], &component_types![Health]);
	assert!(deps.is_empty(), "Concurrent reads do not conflict");

	let c = jobs.allocate_job_id();
	let deps = schedule.admit(&jobs, c, TaskMode::Shared, &[], &component_types![Velocity]);
	assert_eq!(deps, [a], "Concurrent writes conflict");

	let d = jobs.allocate_job_id();
	let deps = schedule.admit(&jobs, d, TaskMode::Shared, &component_types![Health], &[]);
	assert_eq!(deps, [b], "Reads conflict with earlier writes");

	let e = jobs.allocate_job_id();
	let deps = schedule.admit(&jobs, e, TaskMode::Shared, &[], &component_types![Position]);
	assert_eq!(deps, [a, b], "Writes conflict with earlier reads");
}

#[test]
fn exclusive_tasks_wait_on_everything() {
	let jobs = JobRegistry::new();
	let mut schedule = ScheduleState::default();

	let a = jobs.allocate_job_id();
	schedule.admit(&jobs, a, TaskMode::Shared, &component_types![Position], &[]);
	let b = jobs.allocate_job_id();
	schedule.admit(&jobs, b, TaskMode::Shared, &[], &component_types![Health]);

	let x = jobs.allocate_job_id();
	assert_eq!(schedule.admit(&jobs, x, TaskMode::Exclusive, &[], &[]), [a, b]);
	assert_eq!(schedule.active_tasks(), 0);

	let c = jobs.allocate_job_id();
	assert_eq!(schedule.admit(&jobs, c, TaskMode::Shared, &[], &[]), [x], "Shared tasks wait on the last exclusive task");

	let y = jobs.allocate_job_id();
	assert_eq!(schedule.admit(&jobs, y, TaskMode::Exclusive, &[], &[]), [x, c]);
}

#[test]
fn finished_tasks_are_pruned() {
	let jobs = JobRegistry::new();
	let mut schedule = ScheduleState::default();

	let a = jobs.allocate_job_id();
	schedule.admit(&jobs, a, TaskMode::Shared, &[], &component_types![Position]);
	jobs.finish_job_id(a);

	let b = jobs.allocate_job_id();
	let deps = schedule.admit(&jobs, b, TaskMode::Shared, &[], &component_types![Position]);
	assert!(deps.is_empty(), "Finished tasks are no longer waited on");
	assert_eq!(schedule.active_tasks(), 1);
}

#[test]
fn disjoint_shared_tasks_run_together() {
	let world = World::new();
	let mut first = TaskContext::new(&world);
	let mut second = TaskContext::new(&world);

	first.begin(TaskMode::Shared, &[], &component_types![Position]);
	second.begin(TaskMode::Shared, &component_types![Velocity], &component_types![Health]);
	assert!(second.dependencies().is_empty());
	assert_ne!(first.job_id(), second.job_id());

	first.end();
	second.end();
	assert!(world.jobs().is_job_finished(first.job_id()));
	assert!(world.jobs().is_job_finished(second.job_id()));
}

#[test]
fn readers_wait_for_writers() {
	let mut world = World::new();
	let cluster = world.get_cluster(&component_types![Health], &[], true).unwrap();
	let entity = world.new_entity(cluster);
	let world = &world;
	let (sender, receiver) = channel();

	std::thread::scope(|scope| {
		let mut writer = TaskContext::new(world);
		writer.begin(TaskMode::Shared, &[], &component_types![Health]);

		scope.spawn(move || {
			let mut reader = TaskContext::new(world);
			reader.begin(TaskMode::Shared, &component_types![Health], &[]);
			let value = reader.get_component::<Health>(entity).unwrap().0;
			reader.end();
			sender.send(value).unwrap();
		});

		std::thread::sleep(Duration::from_millis(50));
		assert!(receiver.try_recv().is_err(), "The reader must not run before the writer ends");

		*writer.get_component_mut::<Health>(entity).unwrap() = Health(42);
		writer.end();
		assert_eq!(receiver.recv().unwrap(), 42);
	});
}

#[test]
fn shared_tasks_wait_for_exclusive_tasks() {
	let world = World::new();
	let (sender, receiver) = channel();

	std::thread::scope(|scope| {
		let mut writer = TaskContext::new(&world);
		writer.begin(TaskMode::Exclusive, &[], &[]);
		let entity = writer.add_entity();

		let world = &world;
		scope.spawn(move || {
			let mut reader = TaskContext::new(world);
			reader.begin(TaskMode::Shared, &[], &[]);
			let valid = reader.is_entity_valid(entity);
			reader.end();
			sender.send(valid).unwrap();
		});

		std::thread::sleep(Duration::from_millis(50));
		assert!(receiver.try_recv().is_err());

		writer.end();
		assert!(receiver.recv().unwrap(), "The entity is created once the exclusive task ends");
	});
}
