//! Higher Half Direct Map (HHDM) translation.
//!
//! Single source of truth for the HHDM offset.  The bootloader hands the
//! kernel an offset such that physical address `p` is readable at virtual
//! address `p + offset`; everything that needs to inspect firmware-owned
//! physical memory (ACPI tables, LAPIC MMIO) translates through here.

use core::sync::atomic::{AtomicU64, Ordering};

use crate::InitFlag;

static HHDM_OFFSET: AtomicU64 = AtomicU64::new(0);
static HHDM_INIT: InitFlag = InitFlag::new();

/// Record the HHDM offset.  Called once during platform bring-up.
///
/// # Panics
///
/// Panics on a second call: the offset is single-assignment.
pub fn init(offset: u64) {
    HHDM_OFFSET.store(offset, Ordering::Release);

    if !HHDM_INIT.init_once() {
        panic!("HHDM already initialized - init() called twice!");
    }
}

#[inline]
pub fn is_available() -> bool {
    HHDM_INIT.is_set()
}

/// The HHDM offset, or `None` before [`init`] has run.
#[inline]
pub fn try_offset() -> Option<u64> {
    if is_available() {
        Some(HHDM_OFFSET.load(Ordering::Acquire))
    } else {
        None
    }
}

/// Translate a physical address into a readable virtual pointer.
///
/// Returns `None` if the HHDM is not initialized or the translation would
/// overflow.  The pointer is only as valid as the physical address: callers
/// must ensure the region is actually mapped and readable.
#[inline]
pub fn phys_to_virt(phys: u64) -> Option<*const u8> {
    let offset = try_offset()?;
    phys.checked_add(offset).map(|virt| virt as *const u8)
}
