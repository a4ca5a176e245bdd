use crate::jobs::{JobRegistry, JobSystem, INVALID_JOB_ID};
use std::sync::Arc;

#[test]
fn job_ids_are_monotonic() {
	let jobs = JobRegistry::new();
	let a = jobs.allocate_job_id();
	let b = jobs.allocate_job_id();
	assert_ne!(a, INVALID_JOB_ID);
	assert!(b > a);
	assert_eq!(jobs.pending(), 2);
}

#[test]
fn finishing_a_job_releases_waiters() {
	let jobs = Arc::new(JobRegistry::new());
	let job = jobs.allocate_job_id();
	assert!(!jobs.is_job_finished(job));

	let waiter = {
		let jobs = jobs.clone();
		std::thread::spawn(move || {
			jobs.wait_job(job);
			jobs.is_job_finished(job)
		})
	};

	jobs.finish_job_id(job);
	assert!(waiter.join().unwrap());
	assert_eq!(jobs.pending(), 0);

	jobs.wait_job(job);
	jobs.wait_job(INVALID_JOB_ID);
	assert!(jobs.is_job_finished(INVALID_JOB_ID));
}
