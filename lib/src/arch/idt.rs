//! Interrupt vector layout.
//!
//! Vectors 0-31 are CPU exceptions, hardware IRQ lines start at
//! [`IRQ_BASE_VECTOR`], and the LAPIC spurious vector sits at the top of
//! the table.

/// First vector used for hardware IRQs.
pub const IRQ_BASE_VECTOR: u8 = 32;

/// Vector programmed into the LAPIC spurious-interrupt register.
pub const SPURIOUS_VECTOR: u8 = 0xFF;
