//! 8259A legacy PIC driver.
//!
//! Serves as the fallback interrupt controller when no Local APIC is
//! available, and gets quiesced out of the way when one is.  All operations
//! take the platform-neutral IRQ line number (0-15); lines 8-15 live on the
//! slave controller behind the cascade.

use ember_lib::io::Port;
use ember_lib::klog_debug;
use ember_lib::ports::IO_DELAY;

const PIC1_COMMAND: Port<u8> = Port::new(0x20);
const PIC1_DATA: Port<u8> = Port::new(0x21);
const PIC2_COMMAND: Port<u8> = Port::new(0xA0);
const PIC2_DATA: Port<u8> = Port::new(0xA1);

const PIC_EOI: u8 = 0x20;
const ICW1_INIT: u8 = 0x10;
const ICW1_ICW4: u8 = 0x01;
const ICW4_8086: u8 = 0x01;
const CASCADE_IRQ: u8 = 2;

/// Lines per controller; 8-15 are relayed through the slave.
const LINES_PER_PIC: u8 = 8;
const PIC_LINES: u8 = 16;

/// Settle delay between initialization words, for controllers that need it.
#[inline]
fn io_wait() {
    unsafe { IO_DELAY.write(0) };
}

/// Remap both controllers so IRQ 0-15 land on `vector_base..vector_base+16`,
/// leaving every line masked.
///
/// The power-on mapping overlays the CPU exception vectors; remapping must
/// happen before any line is unmasked.
pub fn remap(vector_base: u8) {
    unsafe {
        PIC1_COMMAND.write(ICW1_INIT | ICW1_ICW4);
        io_wait();
        PIC2_COMMAND.write(ICW1_INIT | ICW1_ICW4);
        io_wait();
        PIC1_DATA.write(vector_base);
        io_wait();
        PIC2_DATA.write(vector_base + LINES_PER_PIC);
        io_wait();
        PIC1_DATA.write(1 << CASCADE_IRQ);
        io_wait();
        PIC2_DATA.write(CASCADE_IRQ);
        io_wait();
        PIC1_DATA.write(ICW4_8086);
        io_wait();
        PIC2_DATA.write(ICW4_8086);
        io_wait();

        // Everything starts masked; lines open up as handlers register.
        PIC1_DATA.write(0xFF);
        PIC2_DATA.write(0xFF);
    }
    klog_debug!("PIC: Remapped to vector base {}", vector_base);
}

/// Mask a line via OCW1.  Returns -1 for out-of-range lines.
pub fn mask_line(irq: u8) -> i32 {
    if irq >= PIC_LINES {
        return -1;
    }
    let (data, bit) = if irq < LINES_PER_PIC {
        (PIC1_DATA, irq)
    } else {
        (PIC2_DATA, irq - LINES_PER_PIC)
    };
    unsafe {
        let mask = data.read();
        data.write(mask | (1 << bit));
    }
    0
}

/// Unmask a line via OCW1.  Returns -1 for out-of-range lines.
///
/// Unmasking a slave line also opens the cascade line on the master, or the
/// slave's events would never reach the CPU.
pub fn unmask_line(irq: u8) -> i32 {
    if irq >= PIC_LINES {
        return -1;
    }
    unsafe {
        if irq < LINES_PER_PIC {
            let mask = PIC1_DATA.read();
            PIC1_DATA.write(mask & !(1 << irq));
        } else {
            let mask = PIC2_DATA.read();
            PIC2_DATA.write(mask & !(1 << (irq - LINES_PER_PIC)));
            let master = PIC1_DATA.read();
            PIC1_DATA.write(master & !(1 << CASCADE_IRQ));
        }
    }
    0
}

/// Acknowledge an interrupt.  Slave lines need an EOI to both controllers;
/// the master always gets one.
pub fn send_eoi(irq: u8) {
    unsafe {
        if irq >= LINES_PER_PIC {
            PIC2_COMMAND.write(PIC_EOI);
        }
        PIC1_COMMAND.write(PIC_EOI);
    }
}

/// Mask everything and flush any pending acknowledgments.  Called when the
/// Local APIC takes over interrupt delivery.
pub fn quiesce_disable() {
    unsafe {
        PIC1_DATA.write(0xFF);
        PIC2_DATA.write(0xFF);
        PIC1_COMMAND.write(PIC_EOI);
        PIC2_COMMAND.write(PIC_EOI);
    }
    klog_debug!("PIC: Quiesced and masked");
}
