mod entity_tests;
mod cluster_tests;
mod resolver_tests;
mod scheduler_tests;
mod job_tests;

use crate::components::Component;
use crate::tasks::{TaskContext, TaskMode};
use crate::world::World;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default, Component, Debug, Copy, Clone, PartialEq)]
pub struct Position(pub f32, pub f32);

#[derive(Default, Component, Debug, Copy, Clone, PartialEq)]
pub struct Velocity(pub f32, pub f32);

#[derive(Default, Component, Debug, Copy, Clone, PartialEq)]
pub struct Health(pub u32);

#[derive(Default, Component, Debug, Copy, Clone, PartialEq)]
pub struct Frozen;

/// Counts how many times its values are dropped.
#[derive(Default, Component)]
pub struct Tracked {
	pub drops: Option<Arc<AtomicUsize>>,
	pub value: u32,
}

impl Tracked {
	pub fn new(drops: &Arc<AtomicUsize>, value: u32) -> Self {
		Self {
			drops: Some(drops.clone()),
			value,
		}
	}
}

impl Drop for Tracked {
	fn drop(&mut self) {
		if let Some(drops) = &self.drops {
			drops.fetch_add(1, Ordering::SeqCst);
		}
	}
}

pub fn drops(counter: &Arc<AtomicUsize>) -> usize {
	counter.load(Ordering::SeqCst)
}

/// Runs `func` inside a single exclusive task.
pub fn exclusive<R>(world: &World, func: impl FnOnce(&mut TaskContext<'_>) -> R) -> R {
	let mut ctx = TaskContext::new(world);
	ctx.begin(TaskMode::Exclusive, &[], &[]);
	let result = func(&mut ctx);
	ctx.end();
	result
}
