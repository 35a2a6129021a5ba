//! Job Queue
//!
//! Batches and deduplicates deferred work. Effects that opt into queued
//! re-execution (via the `queue_effect` scheduler) and watcher handlers
//! land here instead of running inside the triggering write; the host
//! drains the queue at its cooperative checkpoint with `flush_jobs` or
//! `tick`.
//!
//! # How Flushing Works
//!
//! 1. `queue_job` appends a job unless one with the same identity is
//!    already pending, then marks a flush as pending (unless a flush is
//!    pending or running already).
//!
//! 2. `flush_jobs` snapshots the queue, leaves it empty, and runs the
//!    snapshot in enqueue order. Jobs enqueued while the pass runs are
//!    deferred: the pass never sees them, and a follow-up flush is
//!    requested at the end so they are not stranded.
//!
//! 3. A `flush_jobs` call during a running flush is a no-op.
//!
//! # Threading
//!
//! The queue is thread-local: the engine is a single logical thread of
//! control, and each OS thread gets an independent queue.

use std::cell::RefCell;
use std::fmt::Debug;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::reactive::Effect;

/// Counter for generating unique callback-job IDs.
static JOB_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique callback-job ID.
fn next_job_id() -> u64 {
    JOB_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

thread_local! {
    static QUEUE: RefCell<QueueState> = RefCell::new(QueueState {
        jobs: Vec::new(),
        flush_pending: false,
        flushing: false,
    });
}

struct QueueState {
    jobs: Vec<Job>,
    flush_pending: bool,
    flushing: bool,
}

/// Identity used for de-duplication while a job is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobKey {
    /// An effect re-run, identified by the effect's ID.
    Effect(u64),

    /// A callback, identified by an ID minted at construction. Clones of
    /// the same job share the key, so a handler built once coalesces.
    Callback(u64),
}

#[derive(Clone)]
enum JobTask {
    Effect(Effect),
    Callback(Arc<dyn Fn() + Send + Sync>),
}

/// A unit of deferred work.
#[derive(Clone)]
pub struct Job {
    key: JobKey,
    task: JobTask,
}

impl Job {
    /// A job that re-runs `effect`. Its identity is the effect's ID, so a
    /// pending re-run of the same effect is never enqueued twice.
    pub fn effect(effect: Effect) -> Self {
        Self {
            key: JobKey::Effect(effect.id()),
            task: JobTask::Effect(effect),
        }
    }

    /// A job that invokes `callback`. Each call mints a fresh identity;
    /// clone the job to re-enqueue the same identity later.
    pub fn callback<F>(callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            key: JobKey::Callback(next_job_id()),
            task: JobTask::Callback(Arc::new(callback)),
        }
    }

    fn invoke(&self) {
        match &self.task {
            JobTask::Effect(effect) => {
                effect.run();
            }
            JobTask::Callback(callback) => callback(),
        }
    }
}

impl From<Effect> for Job {
    fn from(effect: Effect) -> Self {
        Job::effect(effect)
    }
}

impl Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job").field("key", &self.key).finish()
    }
}

/// Enqueue `job` unless one with the same identity is already pending.
pub fn queue_job(job: Job) {
    QUEUE.with(|queue| {
        let mut state = queue.borrow_mut();

        if state.jobs.iter().any(|pending| pending.key == job.key) {
            tracing::trace!("job {:?} already pending, skipped", job.key);
            return;
        }

        state.jobs.push(job);

        if !state.flush_pending && !state.flushing {
            state.flush_pending = true;
        }
    });
}

/// Ready-made scheduler that defers an effect's re-run to the next flush.
///
/// Configure it with `EffectOptions::new().scheduler(queue_effect)`.
pub fn queue_effect(effect: Effect) {
    queue_job(Job::effect(effect));
}

/// Resets the flushing flag and requests a follow-up flush for jobs that
/// arrived mid-pass. Runs on every exit path, including a panicking job.
struct FlushGuard;

impl Drop for FlushGuard {
    fn drop(&mut self) {
        QUEUE.with(|queue| {
            let mut state = queue.borrow_mut();
            state.flushing = false;
            if !state.jobs.is_empty() {
                state.flush_pending = true;
            }
        });
    }
}

/// Run every job that was pending when the call started.
///
/// Jobs run in enqueue order. A call during a running flush is a no-op.
pub fn flush_jobs() {
    let jobs = QUEUE.with(|queue| {
        let mut state = queue.borrow_mut();
        if state.flushing {
            return None;
        }

        state.flushing = true;
        state.flush_pending = false;
        Some(mem::take(&mut state.jobs))
    });

    let Some(jobs) = jobs else {
        return;
    };

    if !jobs.is_empty() {
        tracing::debug!("flushing {} job(s)", jobs.len());
    }

    let _guard = FlushGuard;
    for job in &jobs {
        job.invoke();
    }
}

/// Cooperative checkpoint: run a flush if one is pending.
///
/// Returns whether a flush is still pending afterwards, i.e. whether jobs
/// arrived during the pass and another tick is needed.
pub fn tick() -> bool {
    if is_flush_pending() {
        flush_jobs();
    }
    is_flush_pending()
}

/// Whether a flush has been requested and not yet run.
pub fn is_flush_pending() -> bool {
    QUEUE.with(|queue| queue.borrow().flush_pending)
}

/// Whether a flush pass is running right now on this thread.
pub fn is_flushing() -> bool {
    QUEUE.with(|queue| queue.borrow().flushing)
}

/// Number of jobs waiting for the next flush.
pub fn pending_jobs() -> usize {
    QUEUE.with(|queue| queue.borrow().jobs.len())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
