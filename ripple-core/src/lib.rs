//! Ripple Core
//!
//! This crate provides a minimal reactive dependency-tracking and
//! effect-scheduling engine. It implements:
//!
//! - Plain-object state with accessor-based read/write interception
//! - Automatic dependency tracking between properties and effects
//! - Synchronous and batched (queued) effect re-execution
//! - Computed values and watchers built on the same effect runtime
//!
//! The engine is self-contained: it knows nothing about rendering,
//! components, or I/O. A host drives it by mutating wrapped state and
//! pumping the job queue at its own cadence.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `value`: the dynamic value model (`Value`, conversions, snapshots)
//! - `object`: plain-object targets (`Obj`), raw field storage
//! - `graph`: per-target dependency maps and the batched job queue
//! - `reactive`: effects, the execution stack, wrappers, computeds,
//!   watchers
//!
//! # Example
//!
//! ```rust,ignore
//! use ripple_core::graph::{flush_jobs, queue_effect};
//! use ripple_core::object::Obj;
//! use ripple_core::reactive::{computed, effect, EffectOptions, Reactive};
//! use ripple_core::value::Value;
//!
//! // Observable state
//! let state = Reactive::new([("num", 100)].into_iter().collect::<Obj>());
//!
//! // A derived value, recomputed on demand
//! let doubled = {
//!     let state = state.clone();
//!     computed(move || Value::Int(state.get("num").as_int().unwrap_or(0) * 2))
//! };
//!
//! // A batched effect: re-runs are coalesced until the next flush
//! let render = {
//!     let state = state.clone();
//!     effect(
//!         move || {
//!             println!("num is {:?}", state.get("num"));
//!             Value::Null
//!         },
//!         EffectOptions::new().scheduler(queue_effect),
//!     )
//! };
//!
//! state.set("num", 101);
//! state.set("num", 102);
//! flush_jobs(); // one re-run, printing 102
//! ```

pub mod graph;
pub mod object;
pub mod reactive;
pub mod value;
