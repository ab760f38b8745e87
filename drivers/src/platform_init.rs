//! Platform bring-up: interrupt-controller selection and service
//! registration.
//!
//! Exactly one interrupt controller is active per machine.  Bring-up probes
//! for a Local APIC and falls back to the legacy PIC, then registers a
//! single `'static` service table wired to whichever controller won.  The
//! dispatch path in `core` never knows which one it is talking to.

use core::ffi::c_void;
use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

use ember_acpi::tables::{AcpiTables, Rsdp};
use ember_core::platform::{self, PlatformServices};
use ember_lib::arch::idt::IRQ_BASE_VECTOR;
use ember_lib::{InitFlag, klog_debug, klog_info};

use crate::{apic, pic, serial};

static PLATFORM_READY: InitFlag = InitFlag::new();
static RSDP_PTR: AtomicPtr<c_void> = AtomicPtr::new(ptr::null_mut());

fn pic_send_eoi(irq: u8) {
    pic::send_eoi(irq);
}

fn pic_mask_line(irq: u8) -> i32 {
    pic::mask_line(irq)
}

fn pic_unmask_line(irq: u8) -> i32 {
    pic::unmask_line(irq)
}

fn apic_send_eoi(_irq: u8) {
    // The LAPIC EOI register is line-agnostic.
    apic::send_eoi();
}

fn no_line_control(_irq: u8) -> i32 {
    // Per-line control in APIC mode needs an IOAPIC, which this platform
    // layer does not drive; the quiesced PIC keeps the legacy lines dark.
    -1
}

fn rsdp_available() -> bool {
    !RSDP_PTR.load(Ordering::Acquire).is_null()
}

fn rsdp_address() -> *const c_void {
    RSDP_PTR.load(Ordering::Acquire)
}

static PIC_PLATFORM: PlatformServices = PlatformServices {
    irq_send_eoi: pic_send_eoi,
    irq_mask_line: pic_mask_line,
    irq_unmask_line: pic_unmask_line,
    is_rsdp_available: rsdp_available,
    get_rsdp_address: rsdp_address,
};

static APIC_PLATFORM: PlatformServices = PlatformServices {
    irq_send_eoi: apic_send_eoi,
    irq_mask_line: no_line_control,
    irq_unmask_line: no_line_control,
    is_rsdp_available: rsdp_available,
    get_rsdp_address: rsdp_address,
};

/// Bring up the platform: console, controllers, service table, IRQ
/// framework.  `rsdp` is the firmware root pointer from the bootloader
/// (null if it reported none).
pub fn init(rsdp: *const c_void) {
    if !PLATFORM_READY.init_once() {
        klog_info!("PLATFORM: init() called twice, ignoring");
        return;
    }

    serial::init();
    RSDP_PTR.store(rsdp as *mut c_void, Ordering::Release);

    // The PIC gets remapped even when an APIC takes over: spurious legacy
    // vectors must not land on CPU exceptions.
    pic::remap(IRQ_BASE_VECTOR);

    let services: &'static PlatformServices = if apic::detect() && apic::init() == 0 {
        pic::quiesce_disable();
        klog_debug!("PLATFORM: Using Local APIC for interrupt control");
        &APIC_PLATFORM
    } else {
        klog_debug!("PLATFORM: Using legacy PIC for interrupt control");
        &PIC_PLATFORM
    };

    platform::register_platform_services(services);
    ember_core::irq::init();
    klog_info!("PLATFORM: Bring-up complete");
}

pub fn is_ready() -> bool {
    PLATFORM_READY.is_set()
}

/// Validated handle to the firmware ACPI tables, if the platform reported
/// an RSDP.  Each call re-validates the root pointer; discovery is cheap
/// and stateless.
pub fn acpi_tables() -> Option<AcpiTables> {
    if !is_ready() || !platform::is_rsdp_available() {
        return None;
    }
    AcpiTables::from_rsdp(platform::get_rsdp_address() as *const Rsdp)
}
