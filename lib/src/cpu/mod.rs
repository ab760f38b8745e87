pub mod cpuid;
pub mod interrupts;
pub mod msr;

pub use cpuid::*;
pub use interrupts::*;
pub use msr::*;
