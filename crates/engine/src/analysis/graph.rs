//! Job graph schedulability.
//!
//! The check is deliberately shallow: a workflow is schedulable when at least
//! one non-empty job has no `needs`. Cycles among the remaining jobs are not
//! detected.

use indexmap::IndexMap;
use runcheck_types::Job;

/// Outcome of the schedulability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphVerdict {
    Schedulable,
    /// Every non-empty job waits on another job.
    NoRunnableJob,
    /// Every job entry is empty (this includes a workflow with no jobs).
    AllJobsEmpty,
}

/// Running counts collected while walking a job map.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobGraphTally {
    total: usize,
    empty: usize,
    has_root: bool,
}

impl JobGraphTally {
    /// Accounts for one job entry; `None` is an empty job body.
    pub fn record(&mut self, job: Option<&Job>) {
        self.total += 1;
        match job {
            None => self.empty += 1,
            Some(job) if job.is_root() => self.has_root = true,
            Some(_) => {}
        }
    }

    pub fn verdict(&self) -> GraphVerdict {
        if self.empty == self.total {
            GraphVerdict::AllJobsEmpty
        } else if !self.has_root {
            GraphVerdict::NoRunnableJob
        } else {
            GraphVerdict::Schedulable
        }
    }
}

/// Determines whether any job in `jobs` can start.
pub fn validate_job_graph(jobs: &IndexMap<String, Option<Job>>) -> GraphVerdict {
    let mut tally = JobGraphTally::default();
    for job in jobs.values() {
        tally.record(job.as_ref());
    }
    tally.verdict()
}
