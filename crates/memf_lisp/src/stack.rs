//! Stack growth for deeply nested predicates.
//!
//! Validation accepts arbitrarily deep nesting, so `((((...))))` recurses
//! once per scope in the evaluator.

/// Grow the stack when less than this remains (64KB).
const RED_ZONE: usize = 64 * 1024;

/// Size of each new stack segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
