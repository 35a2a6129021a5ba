//! Dependency Graph and Scheduling
//!
//! This module implements the bookkeeping half of the engine: which
//! effects depend on which properties, and when deferred effects run.
//!
//! # Overview
//!
//! - `DepMap` maps property keys to the ordered set of subscribed
//!   effects. Every observable target owns one; there is no global
//!   registry, so dependency state lives and dies with its target.
//!
//! - The job queue batches effects and handlers that opt into deferred
//!   re-execution, deduplicating by job identity. The host drains it at
//!   its cooperative checkpoint with `flush_jobs` or `tick`.
//!
//! # Design Decisions
//!
//! 1. Dependency state is distributed per target rather than centralized:
//!    dropping a target drops its dependency sets, which is what keeps
//!    unobserved objects collectible.
//!
//! 2. Subscriber sets preserve insertion order, so triggering is
//!    deterministic: first subscribed, first notified.
//!
//! 3. Flushes run over a snapshot. Work enqueued mid-flush defers to the
//!    next pass instead of extending the current one.

mod deps;
mod queue;

pub use deps::DepMap;
pub use queue::{
    flush_jobs, is_flush_pending, is_flushing, pending_jobs, queue_effect, queue_job, tick, Job,
};
