//! COM1 serial console and klog backend.
//!
//! Output-only: the console exists so kernel logging has somewhere to go.
//! Initialisation programs the UART for 115200 8N1 with FIFOs enabled, then
//! registers [`serial_klog_backend`] so klog leaves its early-boot fallback.

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicBool, Ordering};

use ember_lib::cpu;
use ember_lib::klog;
use ember_lib::ports::{
    COM1, UART_FCR_14_BYTE_THRESHOLD, UART_FCR_CLEAR_RX, UART_FCR_CLEAR_TX, UART_FCR_ENABLE_FIFO,
    UART_LCR_8N1, UART_LCR_DLAB, UART_MCR_AUX2, UART_MCR_DTR, UART_MCR_RTS, UART_REG_FCR,
    UART_REG_IER, UART_REG_LCR, UART_REG_MCR, UART_REG_THR,
};
use ember_lib::InitFlag;

static SERIAL_READY: InitFlag = InitFlag::new();

/// Divisor for 115200 baud on a standard 1.8432 MHz UART clock.
const BAUD_DIVISOR: u16 = 1;

/// Program the UART and take over kernel log output.
pub fn init() {
    if !SERIAL_READY.init_once() {
        return;
    }

    unsafe {
        // No UART interrupts: this console is polled, TX-only.
        COM1.offset(UART_REG_IER).write(0x00);

        COM1.offset(UART_REG_LCR).write(UART_LCR_DLAB);
        COM1.offset(UART_REG_THR).write(BAUD_DIVISOR as u8);
        COM1.offset(UART_REG_IER).write((BAUD_DIVISOR >> 8) as u8);
        COM1.offset(UART_REG_LCR).write(UART_LCR_8N1);

        COM1.offset(UART_REG_FCR).write(
            UART_FCR_ENABLE_FIFO | UART_FCR_CLEAR_RX | UART_FCR_CLEAR_TX
                | UART_FCR_14_BYTE_THRESHOLD,
        );

        COM1.offset(UART_REG_MCR)
            .write(UART_MCR_DTR | UART_MCR_RTS | UART_MCR_AUX2);
    }

    klog::klog_register_backend(serial_klog_backend);
}

pub fn is_ready() -> bool {
    SERIAL_READY.is_set()
}

/// Spinlock for klog serial output.
///
/// Uses only cli/sti plus an `AtomicBool` so it is safe from any context,
/// including the interrupt path itself.
static KLOG_LOCK: AtomicBool = AtomicBool::new(false);

fn serial_klog_backend(args: fmt::Arguments<'_>) {
    let saved_flags = cpu::save_flags_cli();
    while KLOG_LOCK
        .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
        .is_err()
    {
        core::hint::spin_loop();
    }

    struct KlogWriter;
    impl fmt::Write for KlogWriter {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            unsafe { ember_lib::ports::serial_write_bytes(COM1, s.as_bytes()) };
            Ok(())
        }
    }

    let _ = fmt::write(&mut KlogWriter, args);
    let _ = KlogWriter.write_str("\n");

    KLOG_LOCK.store(false, Ordering::Release);
    cpu::restore_flags(saved_flags);
}
