//! The job interface tasks are scheduled against.
//!
//! The world never spawns threads. It only allocates job ids, waits on them and marks them finished
//! through a [JobSystem], which callers may back with their own runtime.

mod job_registry;

pub use job_registry::JobRegistry;

/// Identifies one unit of work. Ids are monotonic; [`INVALID_JOB_ID`] is never allocated.
pub type JobId = u64;

/// The id that refers to no job. Waiting on it returns immediately.
pub const INVALID_JOB_ID: JobId = 0;

pub trait JobSystem: Send + Sync {
	/// Allocates a new unfinished job id.
	fn allocate_job_id(&self) -> JobId;

	/// Blocks the calling thread until `job` is finished.
	fn wait_job(&self, job: JobId);

	/// Marks `job` finished and wakes every waiter.
	fn finish_job_id(&self, job: JobId);

	fn is_job_finished(&self, job: JobId) -> bool;
}
