//! Execution Stack
//!
//! The execution stack tracks which effect is currently running. This
//! enables automatic dependency tracking: when a wrapped property is read,
//! the read is attributed to the effect on top of the stack.
//!
//! # Implementation
//!
//! We use a thread-local stack of effect handles. When an effect starts
//! running it is pushed onto the stack; when it finishes (or panics) the
//! RAII frame pops it and the previous top becomes active again.
//!
//! This design supports nested runs (an effect whose body runs another
//! effect, as a computed value does) and doubles as the re-entrancy guard:
//! entering an effect that is already somewhere on the stack is refused.

use std::cell::RefCell;

use super::Effect;

/// The per-thread stack of running effects.
///
/// Reads are attributed to the top entry. Tracking is a per-thread affair,
/// so no synchronization is needed here.
thread_local! {
    static ACTIVE_EFFECTS: RefCell<Vec<Effect>> = RefCell::new(Vec::new());
}

/// Entry points for querying and entering the execution stack.
pub struct ExecutionStack;

/// Frame that pops the stack when dropped.
///
/// This keeps the stack consistent even if the effect body panics.
pub struct StackFrame {
    effect_id: u64,
}

impl ExecutionStack {
    /// Push `effect` and make it the active effect.
    ///
    /// Returns `None` when the effect is already on the stack: a re-entrant
    /// run is refused and the caller should skip execution. The frame pops
    /// the stack when dropped.
    pub fn enter(effect: Effect) -> Option<StackFrame> {
        ACTIVE_EFFECTS.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.iter().any(|running| running.id() == effect.id()) {
                return None;
            }

            let effect_id = effect.id();
            stack.push(effect);
            Some(StackFrame { effect_id })
        })
    }

    /// Check whether any effect is currently running on this thread.
    pub fn is_active() -> bool {
        ACTIVE_EFFECTS.with(|stack| !stack.borrow().is_empty())
    }

    /// The effect reads are currently attributed to, if any.
    pub fn active() -> Option<Effect> {
        ACTIVE_EFFECTS.with(|stack| stack.borrow().last().cloned())
    }

    /// Current depth of the stack.
    pub fn depth() -> usize {
        ACTIVE_EFFECTS.with(|stack| stack.borrow().len())
    }
}

impl Drop for StackFrame {
    fn drop(&mut self) {
        ACTIVE_EFFECTS.with(|stack| {
            let popped = stack.borrow_mut().pop();

            // Verify we're popping the frame we pushed.
            // This helps catch bugs where frames are dropped out of order.
            if let Some(effect) = popped {
                debug_assert_eq!(
                    effect.id(),
                    self.effect_id,
                    "execution stack mismatch: expected {}, got {}",
                    self.effect_id,
                    effect.id()
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::EffectOptions;
    use crate::value::Value;

    fn noop_effect() -> Effect {
        Effect::new(|| Value::Null, EffectOptions::default())
    }

    #[test]
    fn stack_tracks_active_effect() {
        let effect = noop_effect();
        let id = effect.id();

        assert!(!ExecutionStack::is_active());
        assert!(ExecutionStack::active().is_none());

        {
            let _frame = ExecutionStack::enter(effect).unwrap();

            assert!(ExecutionStack::is_active());
            assert_eq!(ExecutionStack::active().map(|e| e.id()), Some(id));
        }

        // Frame drop restores the empty stack
        assert!(!ExecutionStack::is_active());
        assert!(ExecutionStack::active().is_none());
    }

    #[test]
    fn nested_frames_restore_previous_top() {
        let outer = noop_effect();
        let inner = noop_effect();
        let outer_id = outer.id();
        let inner_id = inner.id();

        {
            let _outer_frame = ExecutionStack::enter(outer).unwrap();
            assert_eq!(ExecutionStack::active().map(|e| e.id()), Some(outer_id));

            {
                let _inner_frame = ExecutionStack::enter(inner).unwrap();
                assert_eq!(ExecutionStack::active().map(|e| e.id()), Some(inner_id));
                assert_eq!(ExecutionStack::depth(), 2);
            }

            // After the inner frame drops, the outer effect is active again
            assert_eq!(ExecutionStack::active().map(|e| e.id()), Some(outer_id));
        }

        assert!(ExecutionStack::active().is_none());
    }

    #[test]
    fn reentering_a_running_effect_is_refused() {
        let effect = noop_effect();

        let _frame = ExecutionStack::enter(effect.clone()).unwrap();
        assert!(ExecutionStack::enter(effect.clone()).is_none());

        // Still exactly one frame deep
        assert_eq!(ExecutionStack::depth(), 1);
    }

    #[test]
    fn reentry_is_refused_even_when_not_on_top() {
        let lower = noop_effect();
        let upper = noop_effect();

        let _lower_frame = ExecutionStack::enter(lower.clone()).unwrap();
        let _upper_frame = ExecutionStack::enter(upper).unwrap();

        assert!(ExecutionStack::enter(lower).is_none());
        assert_eq!(ExecutionStack::depth(), 2);
    }
}
