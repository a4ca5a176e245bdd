use crate::components::{ComponentId, ComponentType};
use crate::jobs::{JobId, JobSystem, INVALID_JOB_ID};
use std::collections::VecDeque;
use nohash_hasher::IntSet;

/// How a task accesses the world.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TaskMode {
	/// Runs concurrently with other shared tasks whose declared component accesses do not conflict.
	/// Structural changes are buffered and committed by a trailing exclusive task when the task ends.
	Shared,
	/// Runs alone: waits for every earlier task, and every later task waits for it.
	/// Has read and write access to every component type.
	Exclusive,
}

/// A running shared task and its declared accesses.
pub(crate) struct ScheduledTask {
	id: JobId,
	reads: IntSet<ComponentId>,
	writes: IntSet<ComponentId>,
}

impl ScheduledTask {
	fn new(id: JobId, reads: &[ComponentType], writes: &[ComponentType]) -> Self {
		Self {
			id,
			reads: reads.iter().map(|t| t.id()).collect(),
			writes: writes.iter().map(|t| t.id()).collect(),
		}
	}

	/// Reads conflict with the other task's writes; writes conflict with any of its accesses.
	fn conflicts_with(&self, other: &ScheduledTask) -> bool {
		self.reads.iter().any(|c| other.writes.contains(c))
			|| self.writes.iter().any(|c| other.reads.contains(c) || other.writes.contains(c))
	}
}

/// The world's task queue: active shared tasks and the last exclusive task.
#[derive(Default)]
pub(crate) struct ScheduleState {
	tasks: VecDeque<ScheduledTask>,
	last_exclusive: JobId,
}

impl ScheduleState {
	/// Registers task `id` and returns the jobs it must wait for before running.
	pub fn admit(
		&mut self, jobs: &dyn JobSystem, id: JobId, mode: TaskMode, reads: &[ComponentType], writes: &[ComponentType],
	) -> Vec<JobId> {
		let mut wait = Vec::new();
		if self.last_exclusive != INVALID_JOB_ID {
			wait.push(self.last_exclusive);
		}

		self.tasks.retain(|t| !jobs.is_job_finished(t.id));

		match mode {
			TaskMode::Exclusive => {
				wait.extend(self.tasks.drain(..).map(|t| t.id));
				self.last_exclusive = id;
			},

			TaskMode::Shared => {
				let task = ScheduledTask::new(id, reads, writes);
				wait.extend(self.tasks.iter().filter(|t| task.conflicts_with(t)).map(|t| t.id));
				self.tasks.push_back(task);
			},
		}

		wait
	}

	#[cfg(test)]
	pub fn active_tasks(&self) -> usize {
		self.tasks.len()
	}
}
