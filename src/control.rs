//! Cancellation and skip intent shared between the observer and worker
//! contexts.
//!
//! Cancel is run-scoped: set once by the observer, observed at every loop
//! iteration and output read, cleared only when a new run resets the state.
//! Skip is step-scoped: consumed by the current step and cleared before the
//! next one begins. Both live behind narrow methods; no raw shared fields
//! cross the context boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::plan::Outcome;

/// Thread-safe cancel/skip flags for one run.
///
/// Clones share the same underlying state, so the observer context and the
/// worker context each hold a clone of the same flags.
#[derive(Clone, Debug, Default)]
pub struct ControlFlags {
    inner: Arc<FlagsInner>,
}

#[derive(Debug, Default)]
struct FlagsInner {
    cancel: AtomicBool,
    skip: AtomicBool,
}

impl ControlFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the entire remaining run.
    pub fn request_cancel(&self) {
        self.inner.cancel.store(true, Ordering::SeqCst);
    }

    /// Request that only the currently executing step be abandoned.
    pub fn request_skip(&self) {
        self.inner.skip.store(true, Ordering::SeqCst);
    }

    /// Clear the step-scoped skip flag. Called before each step starts and
    /// after a skip outcome is handled.
    pub fn clear_skip(&self) {
        self.inner.skip.store(false, Ordering::SeqCst);
    }

    /// Clear both flags. Mandatory at run start: a stale cancel flag from a
    /// cancelled run would otherwise abort every subsequent run instantly.
    pub fn reset(&self) {
        self.inner.cancel.store(false, Ordering::SeqCst);
        self.inner.skip.store(false, Ordering::SeqCst);
    }

    pub fn cancel_requested(&self) -> bool {
        self.inner.cancel.load(Ordering::SeqCst)
    }

    pub fn skip_requested(&self) -> bool {
        self.inner.skip.load(Ordering::SeqCst)
    }

    pub fn should_abort(&self) -> bool {
        self.cancel_requested() || self.skip_requested()
    }

    /// The outcome the current step should return if an interruption has been
    /// requested. Cancel takes precedence over skip.
    pub fn interruption(&self) -> Option<Outcome> {
        if self.cancel_requested() {
            Some(Outcome::Cancel)
        } else if self.skip_requested() {
            Some(Outcome::Skip)
        } else {
            None
        }
    }
}

/// Read-only view of [`ControlFlags`] injected into custom routines.
///
/// Routines poll [`should_abort`](Self::should_abort) at every natural
/// checkpoint (e.g. before processing each filesystem entry) and return early
/// via [`interruption`](Self::interruption). A routine that never polls
/// cannot be interrupted without process semantics; that is a caller-side
/// contract violation.
#[derive(Clone, Debug)]
pub struct AbortProbe {
    flags: ControlFlags,
}

impl AbortProbe {
    pub(crate) fn new(flags: ControlFlags) -> Self {
        Self { flags }
    }

    pub fn should_abort(&self) -> bool {
        self.flags.should_abort()
    }

    pub fn cancel_requested(&self) -> bool {
        self.flags.cancel_requested()
    }

    pub fn skip_requested(&self) -> bool {
        self.flags.skip_requested()
    }

    /// `Some(Cancel)` or `Some(Skip)` when an interruption is pending, with
    /// cancel taking precedence.
    pub fn interruption(&self) -> Option<Outcome> {
        self.flags.interruption()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_takes_precedence_over_skip() {
        let flags = ControlFlags::new();
        flags.request_skip();
        flags.request_cancel();
        assert_eq!(flags.interruption(), Some(Outcome::Cancel));
    }

    #[test]
    fn clear_skip_leaves_cancel_untouched() {
        let flags = ControlFlags::new();
        flags.request_cancel();
        flags.request_skip();
        flags.clear_skip();
        assert!(flags.cancel_requested());
        assert!(!flags.skip_requested());
    }

    #[test]
    fn reset_clears_both_flags() {
        let flags = ControlFlags::new();
        flags.request_cancel();
        flags.request_skip();
        flags.reset();
        assert!(!flags.should_abort());
        assert_eq!(flags.interruption(), None);
    }

    #[test]
    fn clones_share_state() {
        let flags = ControlFlags::new();
        let observer_side = flags.clone();
        observer_side.request_cancel();
        assert!(flags.cancel_requested());
    }
}
