//! Local APIC register offsets and flag layouts.
//!
//! Registers are memory-mapped at 16-byte stride from the base reported by
//! the IA32_APIC_BASE MSR; offsets below are byte offsets from that base.

use bitflags::bitflags;

pub const LAPIC_ID: u32 = 0x020;
pub const LAPIC_VERSION: u32 = 0x030;
pub const LAPIC_EOI: u32 = 0x0B0;
pub const LAPIC_SPURIOUS: u32 = 0x0F0;
pub const LAPIC_ESR: u32 = 0x280;
pub const LAPIC_LVT_TIMER: u32 = 0x320;
pub const LAPIC_LVT_LINT0: u32 = 0x350;
pub const LAPIC_LVT_LINT1: u32 = 0x360;
pub const LAPIC_LVT_ERROR: u32 = 0x370;

/// Physical base address mask of the IA32_APIC_BASE MSR (bits 12-51).
pub const APIC_BASE_ADDR_MASK: u64 = 0x000F_FFFF_FFFF_F000;

bitflags! {
    /// Control bits of the IA32_APIC_BASE MSR.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ApicBaseFlags: u64 {
        const BSP = 1 << 8;
        const X2APIC_ENABLE = 1 << 10;
        const GLOBAL_ENABLE = 1 << 11;
    }
}

bitflags! {
    /// Spurious-interrupt vector register bits (the low byte holds the
    /// spurious vector itself).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SpuriousFlags: u32 {
        const APIC_ENABLE = 1 << 8;
        const FOCUS_DISABLE = 1 << 9;
    }
}

bitflags! {
    /// Local vector table entry bits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LvtFlags: u32 {
        const DELIVERY_EXTINT = 0b111 << 8;
        const MASKED = 1 << 16;
    }
}
