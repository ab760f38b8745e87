//! CPU feature detection via the CPUID instruction.
//!
//! Only the leaves and flags actually referenced by kernel code are defined
//! here.  Add constants as feature detection grows.

/// Execute CPUID with the given leaf (subleaf 0).
/// Returns (eax, ebx, ecx, edx).
#[inline(always)]
pub fn cpuid(leaf: u32) -> (u32, u32, u32, u32) {
    let res = core::arch::x86_64::__cpuid(leaf);
    (res.eax, res.ebx, res.ecx, res.edx)
}

/// Basic CPU information and feature flags.
pub const CPUID_LEAF_FEATURES: u32 = 0x01;

/// EDX bit: on-chip local APIC present.
pub const CPUID_FEAT_EDX_APIC: u32 = 1 << 9;

/// ECX bit: x2APIC mode supported.
pub const CPUID_FEAT_ECX_X2APIC: u32 = 1 << 21;
