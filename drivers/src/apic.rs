//! Local APIC driver.
//!
//! Detection goes through CPUID; the register block is reached through the
//! HHDM mapping of the physical base reported by IA32_APIC_BASE.  Only the
//! pieces the dispatch path needs are programmed here: global enable, the
//! spurious vector, LVT masking, and EOI.

use core::sync::atomic::{AtomicU64, Ordering};

use spin::Once;

use ember_lib::arch::idt::SPURIOUS_VECTOR;
use ember_lib::cpu::{self, Msr};
use ember_lib::{InitFlag, hhdm, klog_debug, klog_info};

use crate::apic_defs::*;

static APIC_AVAILABLE: InitFlag = InitFlag::new();
static X2APIC_AVAILABLE: InitFlag = InitFlag::new();
static APIC_ENABLED: InitFlag = InitFlag::new();
static APIC_BASE_PHYSICAL: AtomicU64 = AtomicU64::new(0);

/// HHDM-mapped register block, resolved once during detect().
static APIC_REGS: Once<ApicRegs> = Once::new();

struct ApicRegs {
    base: *mut u8,
}

// SAFETY: the register block is a fixed MMIO window; the registers touched
// here are per-CPU (EOI, SVR, LVTs), so concurrent access from different
// CPUs targets different hardware state.
unsafe impl Send for ApicRegs {}
unsafe impl Sync for ApicRegs {}

impl ApicRegs {
    #[inline]
    fn read(&self, reg: u32) -> u32 {
        // SAFETY: `reg` is one of the fixed offsets from apic_defs, inside
        // the 4 KiB register page mapped at `base`.
        unsafe { core::ptr::read_volatile(self.base.add(reg as usize) as *const u32) }
    }

    #[inline]
    fn write(&self, reg: u32, value: u32) {
        // SAFETY: as for read().
        unsafe { core::ptr::write_volatile(self.base.add(reg as usize) as *mut u32, value) }
    }
}

/// Detect the Local APIC and map its register block.
pub fn detect() -> bool {
    klog_debug!("APIC: Detecting Local APIC availability...");

    let (_, _, ecx, edx) = cpu::cpuid(cpu::CPUID_LEAF_FEATURES);
    if edx & cpu::CPUID_FEAT_EDX_APIC == 0 {
        klog_debug!("APIC: Local APIC is not available");
        APIC_AVAILABLE.reset();
        return false;
    }

    APIC_AVAILABLE.mark_set();
    if ecx & cpu::CPUID_FEAT_ECX_X2APIC != 0 {
        X2APIC_AVAILABLE.mark_set();
    }

    let apic_base_msr = cpu::read_msr(Msr::APIC_BASE);
    let apic_phys = apic_base_msr & APIC_BASE_ADDR_MASK;
    APIC_BASE_PHYSICAL.store(apic_phys, Ordering::Relaxed);

    match hhdm::phys_to_virt(apic_phys) {
        Some(virt) => {
            APIC_REGS.call_once(|| ApicRegs {
                base: virt as *mut u8,
            });
            let bsp_flag = if ApicBaseFlags::from_bits_truncate(apic_base_msr)
                .contains(ApicBaseFlags::BSP)
            {
                " BSP"
            } else {
                ""
            };
            klog_debug!(
                "APIC: Physical base 0x{:x}, mapped via HHDM{}",
                apic_phys,
                bsp_flag
            );
            true
        }
        None => {
            klog_info!("APIC: ERROR - HHDM unavailable, cannot map registers");
            APIC_AVAILABLE.reset();
            false
        }
    }
}

/// Initialize the Local APIC: global enable, spurious vector, LVTs masked.
pub fn init() -> i32 {
    if !is_available() {
        klog_info!("APIC: Cannot initialize - APIC not available");
        return -1;
    }

    klog_debug!("APIC: Initializing Local APIC");

    let mut apic_base_msr = cpu::read_msr(Msr::APIC_BASE);
    if apic_base_msr & ApicBaseFlags::GLOBAL_ENABLE.bits() == 0 {
        apic_base_msr |= ApicBaseFlags::GLOBAL_ENABLE.bits();
        cpu::write_msr(Msr::APIC_BASE, apic_base_msr);
        klog_debug!("APIC: Enabled APIC globally via MSR");
    }

    enable();

    write_register(LAPIC_LVT_TIMER, LvtFlags::MASKED.bits());
    write_register(LAPIC_LVT_LINT0, LvtFlags::MASKED.bits());
    write_register(LAPIC_LVT_LINT1, LvtFlags::MASKED.bits());
    write_register(LAPIC_LVT_ERROR, LvtFlags::MASKED.bits());

    // LINT0 relays legacy PIC lines until drivers route everything natively.
    write_register(LAPIC_LVT_LINT0, LvtFlags::DELIVERY_EXTINT.bits());

    // Clearing the ESR takes two back-to-back writes.
    write_register(LAPIC_ESR, 0);
    write_register(LAPIC_ESR, 0);

    send_eoi();

    klog_debug!(
        "APIC: ID 0x{:x}, version 0x{:x}",
        get_id(),
        get_version()
    );

    APIC_ENABLED.mark_set();
    klog_debug!("APIC: Initialization complete");
    0
}

pub fn is_available() -> bool {
    APIC_AVAILABLE.is_set_relaxed()
}

pub fn is_x2apic_available() -> bool {
    X2APIC_AVAILABLE.is_set_relaxed()
}

pub fn is_enabled() -> bool {
    APIC_ENABLED.is_set_relaxed()
}

/// Set the spurious vector and the software-enable bit.
pub fn enable() {
    if !is_available() {
        return;
    }
    let mut spurious = read_register(LAPIC_SPURIOUS);
    spurious |= SpuriousFlags::APIC_ENABLE.bits();
    spurious |= SPURIOUS_VECTOR as u32;
    write_register(LAPIC_SPURIOUS, spurious);
    APIC_ENABLED.mark_set();
    klog_debug!("APIC: Local APIC enabled");
}

/// Acknowledge the in-service interrupt.  No-op until the APIC is enabled.
pub fn send_eoi() {
    if !is_enabled() {
        return;
    }
    write_register(LAPIC_EOI, 0);
}

pub fn get_id() -> u32 {
    if !is_available() {
        return 0;
    }
    read_register(LAPIC_ID) >> 24
}

pub fn get_version() -> u32 {
    if !is_available() {
        return 0;
    }
    read_register(LAPIC_VERSION) & 0xFF
}

pub fn read_register(reg: u32) -> u32 {
    if !is_available() {
        return 0;
    }
    APIC_REGS.get().map(|r| r.read(reg)).unwrap_or(0)
}

pub fn write_register(reg: u32, value: u32) {
    if !is_available() {
        return;
    }
    if let Some(r) = APIC_REGS.get() {
        r.write(reg, value);
    }
}
