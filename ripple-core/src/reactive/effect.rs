//! Effect Implementation
//!
//! An Effect wraps a computation as a re-runnable unit. While it runs it is
//! the active effect, so wrapped reads performed by the body subscribe it
//! to the properties it touched.
//!
//! # How Effects Work
//!
//! 1. `effect()` runs the body once at creation (unless lazy) to collect
//!    the initial subscriptions.
//!
//! 2. When a tracked property is written, the effect either re-runs
//!    immediately or is handed to its configured scheduler. The job queue's
//!    `queue_effect` is the usual scheduler: it batches and deduplicates
//!    re-runs until the next flush.
//!
//! 3. Subscriptions accumulate: every run may subscribe the effect to
//!    additional keys.
//!
//! # Re-entrancy
//!
//! An effect that is already on the execution stack is not entered again.
//! A body that writes a key it also reads finishes its current run; the
//! nested invocation is skipped and `run` returns `None`.
//!
//! # Disposal
//!
//! Disposing an effect is the explicit way to end a subscription: a
//! disposed effect never runs again and is pruned from dependency sets on
//! the next trigger of a key it subscribed to.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use super::context::ExecutionStack;
use crate::value::Value;

/// Counter for generating unique effect IDs.
static EFFECT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique effect ID.
fn next_effect_id() -> u64 {
    EFFECT_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Scheduler callback invoked with the effect instead of re-running it.
pub type Scheduler = Arc<dyn Fn(Effect) + Send + Sync>;

/// Configuration for an effect.
///
/// The default is eager (runs once at creation through `effect()`) with no
/// scheduler (re-runs happen synchronously inside the triggering write).
#[derive(Clone, Default)]
pub struct EffectOptions {
    /// Skip the initial run at creation.
    pub lazy: bool,

    /// Re-run policy on trigger. `None` re-runs the effect directly.
    pub scheduler: Option<Scheduler>,
}

impl EffectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the initial run at creation.
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// Route re-runs through `scheduler` instead of running synchronously.
    pub fn scheduler<F>(mut self, scheduler: F) -> Self
    where
        F: Fn(Effect) + Send + Sync + 'static,
    {
        self.scheduler = Some(Arc::new(scheduler));
        self
    }
}

impl Debug for EffectOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectOptions")
            .field("lazy", &self.lazy)
            .field("has_scheduler", &self.scheduler.is_some())
            .finish()
    }
}

/// A re-runnable reactive computation.
///
/// # Example
///
/// ```rust,ignore
/// let state = Reactive::new(Obj::new());
///
/// let logger = {
///     let state = state.clone();
///     effect(move || {
///         println!("count is: {:?}", state.get("count"));
///         Value::Null
///     }, EffectOptions::default())
/// };
///
/// state.set("count", 5);  // Prints: "count is: Int(5)"
/// ```
pub struct Effect {
    /// Unique identifier for this effect.
    id: u64,

    /// The computation body.
    func: Arc<dyn Fn() -> Value + Send + Sync>,

    /// Re-run policy configured at creation.
    scheduler: Option<Scheduler>,

    /// Whether the initial run at creation was skipped.
    lazy: bool,

    /// Whether the effect has been disposed.
    disposed: Arc<AtomicBool>,

    /// Number of completed runs.
    run_count: Arc<AtomicU64>,
}

impl Effect {
    /// Create an effect without running it.
    ///
    /// Use the free function [`effect`] to also perform the initial run.
    pub fn new<F>(func: F, options: EffectOptions) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self {
            id: next_effect_id(),
            func: Arc::new(func),
            scheduler: options.scheduler,
            lazy: options.lazy,
            disposed: Arc::new(AtomicBool::new(false)),
            run_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get the effect's unique ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The configured scheduler, if any.
    pub fn scheduler(&self) -> Option<Scheduler> {
        self.scheduler.clone()
    }

    /// Whether the effect was configured to skip its initial run.
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// Run the body as the active effect and return its result.
    ///
    /// Returns `None` without running when the effect is disposed or
    /// already on the execution stack. The stack frame is restored on every
    /// exit path, including panics.
    pub fn run(&self) -> Option<Value> {
        if self.disposed.load(Ordering::SeqCst) {
            return None;
        }

        let _frame = ExecutionStack::enter(self.clone())?;
        let result = (self.func)();
        self.run_count.fetch_add(1, Ordering::SeqCst);

        Some(result)
    }

    /// Dispose of the effect.
    ///
    /// After disposal, the effect will not run again.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        tracing::trace!("effect {} disposed", self.id);
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Get the number of completed runs.
    pub fn run_count(&self) -> u64 {
        self.run_count.load(Ordering::SeqCst)
    }
}

/// Create an effect and, unless lazy, run it once to collect its initial
/// subscriptions.
///
/// The returned handle stays re-invocable by the caller.
pub fn effect<F>(func: F, options: EffectOptions) -> Effect
where
    F: Fn() -> Value + Send + Sync + 'static,
{
    let lazy = options.lazy;
    let handle = Effect::new(func, options);

    if !lazy {
        handle.run();
    }

    handle
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            func: Arc::clone(&self.func),
            scheduler: self.scheduler.clone(),
            lazy: self.lazy,
            disposed: Arc::clone(&self.disposed),
            run_count: Arc::clone(&self.run_count),
        }
    }
}

impl PartialEq for Effect {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Effect {}

impl std::hash::Hash for Effect {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id)
            .field("run_count", &self.run_count())
            .field("lazy", &self.lazy)
            .field("has_scheduler", &self.scheduler.is_some())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
