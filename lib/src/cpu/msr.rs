//! Model-Specific Register (MSR) addresses and RDMSR/WRMSR wrappers.

use core::arch::asm;

/// An MSR address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Msr(u32);

impl Msr {
    /// IA32_APIC_BASE.
    pub const APIC_BASE: Msr = Msr(0x1B);

    #[inline]
    pub const fn new(address: u32) -> Self {
        Self(address)
    }

    #[inline]
    pub const fn address(self) -> u32 {
        self.0
    }
}

/// Read a 64-bit value from the specified MSR.
#[inline(always)]
pub fn read_msr(msr: Msr) -> u64 {
    let low: u32;
    let high: u32;
    unsafe {
        asm!(
            "rdmsr",
            out("eax") low,
            out("edx") high,
            in("ecx") msr.address(),
            options(nomem, nostack, preserves_flags)
        );
    }
    ((high as u64) << 32) | (low as u64)
}

/// Write a 64-bit value to the specified MSR.
#[inline(always)]
pub fn write_msr(msr: Msr, value: u64) {
    let low = value as u32;
    let high = (value >> 32) as u32;
    unsafe {
        asm!(
            "wrmsr",
            in("eax") low,
            in("edx") high,
            in("ecx") msr.address(),
            options(nomem, nostack, preserves_flags)
        );
    }
}
