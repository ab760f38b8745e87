//! IRQ dispatch framework for EmberOS.
//!
//! This module provides the IRQ table, dispatch logic, and handler
//! registration API.  Hardware-specific handlers live in `drivers`, but the
//! framework lives here in `core` to maintain the one-way dependency:
//! drivers -> core.
//!
//! Platform-specific operations (EOI, line masking) are called via the
//! platform service table registered at bring-up.
//!
//! Acknowledgment ordering: the end-of-interrupt is sent exactly once per
//! dispatched event, and always **before** the registered handler runs.
//! The controller must never sit waiting on arbitrary handler logic, and a
//! nested event of the same class must not stay blocked for the handler's
//! duration.

use core::ffi::c_void;

use ember_lib::IrqMutex;
use ember_lib::arch::idt::IRQ_BASE_VECTOR;
use ember_lib::{InitFlag, InterruptFrame, kdiag_dump_interrupt_frame, klog_debug, klog_info, tsc};

use crate::platform;

/// Maximum number of IRQ lines supported.
pub const IRQ_LINES: usize = 16;

/// Legacy IRQ numbers.
pub const LEGACY_IRQ_TIMER: u8 = 0;
pub const LEGACY_IRQ_KEYBOARD: u8 = 1;
pub const LEGACY_IRQ_CASCADE: u8 = 2;

/// IRQ handler function signature.
pub type IrqHandler = extern "C" fn(u8, *mut InterruptFrame, *mut c_void);

/// Entry in the IRQ table.
#[derive(Clone, Copy)]
pub struct IrqEntry {
    handler: Option<IrqHandler>,
    context: *mut c_void,
    count: u64,
    last_timestamp: u64,
    masked: bool,
    reported_unhandled: bool,
}

// SAFETY: the context pointer is owned by the registrant, which promises it
// stays valid until unregistration; the table itself is only touched under
// the IRQ table lock.
unsafe impl Send for IrqEntry {}

impl IrqEntry {
    pub const fn new() -> Self {
        Self {
            handler: None,
            context: core::ptr::null_mut(),
            count: 0,
            last_timestamp: 0,
            masked: true,
            reported_unhandled: false,
        }
    }
}

impl Default for IrqEntry {
    fn default() -> Self {
        Self::new()
    }
}

static IRQ_TABLE: IrqMutex<[IrqEntry; IRQ_LINES]> = IrqMutex::new([IrqEntry::new(); IRQ_LINES]);
static IRQ_SYSTEM_INIT: InitFlag = InitFlag::new();

/// Access the IRQ table under lock.
#[inline]
fn with_irq_table<R>(f: impl FnOnce(&mut [IrqEntry; IRQ_LINES]) -> R) -> R {
    let mut table = IRQ_TABLE.lock();
    f(&mut table)
}

/// Send EOI to acknowledge an interrupt on `irq`.
#[inline]
fn acknowledge_irq(irq: u8) {
    platform::irq_send_eoi(irq);
}

/// Mask an IRQ line (table state + controller).
pub fn mask_irq_line(irq: u8) {
    if irq as usize >= IRQ_LINES {
        return;
    }
    let newly_masked = with_irq_table(|table| {
        if table[irq as usize].masked {
            return false;
        }
        table[irq as usize].masked = true;
        true
    });
    if newly_masked && platform::irq_mask_line(irq) != 0 {
        klog_info!("IRQ: Controller rejected mask for line {}", irq);
    }
}

/// Unmask an IRQ line (table state + controller).
pub fn unmask_irq_line(irq: u8) {
    if irq as usize >= IRQ_LINES {
        return;
    }
    let newly_unmasked = with_irq_table(|table| {
        if !table[irq as usize].masked {
            return false;
        }
        table[irq as usize].masked = false;
        true
    });
    if newly_unmasked && platform::irq_unmask_line(irq) != 0 {
        klog_info!("IRQ: Controller rejected unmask for line {}", irq);
    }
}

/// Log an unhandled IRQ (only once per line).
fn log_unhandled_irq(irq: u8, vector: u8) {
    if irq as usize >= IRQ_LINES {
        klog_info!("IRQ: Spurious vector {} received", vector);
        return;
    }

    let already_reported = with_irq_table(|table| {
        let entry = &mut table[irq as usize];
        if entry.reported_unhandled {
            true
        } else {
            entry.reported_unhandled = true;
            false
        }
    });
    if already_reported {
        return;
    }
    klog_info!(
        "IRQ: Unhandled IRQ {} (vector {}) - masking line",
        irq,
        vector
    );
}

/// Initialize the IRQ framework (call early, before handler registration).
pub fn init() {
    with_irq_table(|table| {
        for entry in table.iter_mut() {
            *entry = IrqEntry::new();
        }
    });
    IRQ_SYSTEM_INIT.mark_set();
    klog_debug!("IRQ: Framework initialized");
}

/// Check if the IRQ system is initialized.
pub fn is_initialized() -> bool {
    IRQ_SYSTEM_INIT.is_set_relaxed()
}

/// Check if an IRQ line is masked.
pub fn is_masked(irq: u8) -> bool {
    if irq as usize >= IRQ_LINES {
        return true;
    }
    with_irq_table(|table| table[irq as usize].masked)
}

/// Register an IRQ handler and unmask its line.
pub fn register_handler(irq: u8, handler: Option<IrqHandler>, context: *mut c_void) -> i32 {
    if irq as usize >= IRQ_LINES {
        klog_info!("IRQ: Attempted to register handler for invalid line");
        return -1;
    }

    with_irq_table(|table| {
        let entry = &mut table[irq as usize];
        entry.handler = handler;
        entry.context = context;
        entry.reported_unhandled = false;
    });

    klog_debug!("IRQ: Registered handler for line {}", irq);
    unmask_irq_line(irq);
    0
}

/// Unregister an IRQ handler and mask its line.
pub fn unregister_handler(irq: u8) {
    if irq as usize >= IRQ_LINES {
        return;
    }
    with_irq_table(|table| {
        let entry = &mut table[irq as usize];
        entry.handler = None;
        entry.context = core::ptr::null_mut();
        entry.reported_unhandled = false;
    });
    mask_irq_line(irq);
    klog_debug!("IRQ: Unregistered handler for line {}", irq);
}

/// Enable an IRQ line.
pub fn enable_line(irq: u8) {
    if irq as usize >= IRQ_LINES {
        return;
    }
    with_irq_table(|table| {
        table[irq as usize].reported_unhandled = false;
    });
    unmask_irq_line(irq);
}

/// Disable an IRQ line.
pub fn disable_line(irq: u8) {
    if irq as usize >= IRQ_LINES {
        return;
    }
    mask_irq_line(irq);
}

/// Main IRQ dispatch function - called from the IDT trampoline.
///
/// Acknowledges the controller exactly once, then forwards to the
/// registered handler (if any).
pub fn irq_dispatch(frame: *mut InterruptFrame) {
    if frame.is_null() {
        klog_info!("IRQ: Received null frame");
        return;
    }

    let frame_ref = unsafe { &mut *frame };
    let vector = (frame_ref.vector & 0xFF) as u8;

    if !IRQ_SYSTEM_INIT.is_set_relaxed() {
        klog_info!("IRQ: Dispatch received before initialization");
        if vector >= IRQ_BASE_VECTOR {
            acknowledge_irq(vector - IRQ_BASE_VECTOR);
        }
        return;
    }

    if vector < IRQ_BASE_VECTOR {
        klog_info!("IRQ: Received non-IRQ vector {}", vector);
        return;
    }

    let irq = vector - IRQ_BASE_VECTOR;
    if irq as usize >= IRQ_LINES {
        acknowledge_irq(irq);
        log_unhandled_irq(0xFF, vector);
        return;
    }

    // Ack first: after this point the controller may deliver further events
    // on the line; the handler below runs with the line already released.
    acknowledge_irq(irq);

    let expected_cs = frame_ref.cs;
    let expected_rip = frame_ref.rip;

    let handler_snapshot = with_irq_table(|table| {
        let entry = &mut table[irq as usize];
        if entry.handler.is_none() {
            return None;
        }
        entry.count = entry.count.wrapping_add(1);
        entry.last_timestamp = tsc::rdtsc();
        entry.handler.map(|h| (h, entry.context))
    });

    let Some((handler, context)) = handler_snapshot else {
        log_unhandled_irq(irq, vector);
        mask_irq_line(irq);
        return;
    };

    handler(irq, frame, context);

    if frame_ref.cs != expected_cs || frame_ref.rip != expected_rip {
        klog_info!("IRQ: Frame corruption detected on IRQ {} - aborting", irq);
        kdiag_dump_interrupt_frame(frame);
        panic!("IRQ: frame corrupted");
    }
}

/// IRQ statistics structure.
#[repr(C)]
pub struct IrqStats {
    pub count: u64,
    pub last_timestamp: u64,
}

/// Get IRQ statistics for a line.
pub fn get_stats(irq: u8, out_stats: *mut IrqStats) -> i32 {
    if irq as usize >= IRQ_LINES || out_stats.is_null() {
        return -1;
    }
    with_irq_table(|table| unsafe {
        (*out_stats).count = table[irq as usize].count;
        (*out_stats).last_timestamp = table[irq as usize].last_timestamp;
    });
    0
}
