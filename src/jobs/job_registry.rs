use crate::jobs::{JobId, JobSystem, INVALID_JOB_ID};
use nohash_hasher::IntSet;
use parking_lot::{Condvar, Mutex};

/// A minimal [JobSystem] that only tracks job ids.
///
/// Waiting parks the calling thread on a condition variable until the job is finished.
#[derive(Default)]
pub struct JobRegistry {
	state: Mutex<JobState>,
	finished: Condvar,
}

#[derive(Default)]
struct JobState {
	last_id: JobId,
	pending: IntSet<JobId>,
}

impl JobRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of allocated jobs that are not finished yet.
	pub fn pending(&self) -> usize {
		self.state.lock().pending.len()
	}
}

impl JobSystem for JobRegistry {
	fn allocate_job_id(&self) -> JobId {
		let mut state = self.state.lock();
		state.last_id += 1;
		let id = state.last_id;
		state.pending.insert(id);
		id
	}

	fn wait_job(&self, job: JobId) {
		let mut state = self.state.lock();
		while state.pending.contains(&job) {
			self.finished.wait(&mut state);
		}
	}

	fn finish_job_id(&self, job: JobId) {
		let removed = self.state.lock().pending.remove(&job);
		debug_assert!(removed || job == INVALID_JOB_ID, "Job {} finished twice or never allocated", job);
		self.finished.notify_all();
	}

	fn is_job_finished(&self, job: JobId) -> bool {
		!self.state.lock().pending.contains(&job)
	}
}
