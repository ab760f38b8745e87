//! One-shot initialization flags.

use core::sync::atomic::{AtomicBool, Ordering};

/// An atomic "has this been initialized" flag.
///
/// Set once during bring-up, read thereafter.  `reset()` exists for the few
/// detection paths that need to withdraw a tentatively-set flag.
pub struct InitFlag(AtomicBool);

impl InitFlag {
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    #[inline]
    pub fn mark_set(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_set_relaxed(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Attempt the one-time transition.  Returns `true` if this call set the
    /// flag, `false` if it was already set.
    #[inline]
    pub fn init_once(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for InitFlag {
    fn default() -> Self {
        Self::new()
    }
}
