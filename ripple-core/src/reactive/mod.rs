//! Reactive Primitives
//!
//! This module implements the effect runtime and the primitives built on
//! it: the reactive wrapper, computed values, and watchers.
//!
//! # Concepts
//!
//! ## Effects
//!
//! An Effect is a re-runnable computation. While it runs it is the active
//! effect: wrapped reads performed by its body subscribe it to the
//! properties it touched. When a tracked property changes, the effect
//! either re-runs synchronously or is handed to its configured scheduler.
//!
//! ## Reactive Wrappers
//!
//! A Reactive wraps a plain object with accessor interception: `get`
//! records the active effect as a subscriber, `set` notifies subscribers.
//! Nested objects come back wrapped, so deep reactivity is established on
//! demand.
//!
//! ## Computed Values
//!
//! A Computed is a cached derived value. A dependency change only marks it
//! dirty; the next read recomputes. Its subscribers are notified once per
//! clean-to-dirty transition.
//!
//! ## Watchers
//!
//! A Watcher observes a getter and invokes a callback with (new, previous)
//! values after a change, coalesced through the job queue.
//!
//! # Implementation Notes
//!
//! The reactive system uses a thread-local execution stack to detect
//! dependencies automatically. When a wrapped property is read, the read
//! is attributed to the effect on top of the stack.
//!
//! This approach (sometimes called "automatic dependency tracking" or
//! "transparent reactivity") is used by SolidJS, Vue 3, and Leptos.

mod computed;
mod context;
mod effect;
mod watch;
mod wrap;

pub use computed::{computed, Computed};
pub use context::{ExecutionStack, StackFrame};
pub use effect::{effect, Effect, EffectOptions, Scheduler};
pub use watch::{watch, Watcher};
pub use wrap::{wrap, Reactive};
