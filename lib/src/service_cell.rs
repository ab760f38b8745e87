//! Single-assignment holder for a service table.

use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

/// A process-wide slot for a `'static` table of service function pointers.
///
/// Registered once during bring-up by whichever crate owns the concrete
/// implementations, read thereafter.  Builtin tests may re-register to swap
/// in recording fakes; the last registration wins.
pub struct ServiceCell<T> {
    ptr: AtomicPtr<T>,
}

impl<T> ServiceCell<T> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            ptr: AtomicPtr::new(ptr::null_mut()),
        }
    }

    #[inline]
    pub fn register(&self, services: &'static T) {
        self.ptr
            .store(services as *const T as *mut T, Ordering::Release);
    }

    #[inline]
    pub fn get(&self) -> Option<&'static T> {
        let ptr = self.ptr.load(Ordering::Acquire);
        if ptr.is_null() {
            None
        } else {
            // SAFETY: only `register` stores here, and it only accepts
            // `&'static T`.
            Some(unsafe { &*ptr })
        }
    }

    #[inline]
    pub fn is_registered(&self) -> bool {
        !self.ptr.load(Ordering::Relaxed).is_null()
    }
}

impl<T> Default for ServiceCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
