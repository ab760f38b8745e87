//! IRQ dispatch tests - ordering, bounds, and edge paths, driven through a
//! recording fake of the platform service table.

use core::ffi::{c_int, c_void};
use core::ptr;
use core::sync::atomic::{AtomicUsize, Ordering};

use ember_lib::InterruptFrame;
use ember_lib::arch::idt::IRQ_BASE_VECTOR;
use ember_lib::testing::TestResult;
use ember_lib::{assert_eq_test, assert_test, fail, klog_info, pass, run_test};

use crate::irq::{self, IRQ_LINES, IrqStats};
use crate::platform::{PlatformServices, register_platform_services};

// Recorders for the fake controller and handler.  A shared sequence counter
// captures the relative order of the EOI and the handler call; 0 means
// "never happened".
static CALL_SEQ: AtomicUsize = AtomicUsize::new(0);
static EOI_CALLS: AtomicUsize = AtomicUsize::new(0);
static EOI_SEQ: AtomicUsize = AtomicUsize::new(0);
static HANDLER_CALLS: AtomicUsize = AtomicUsize::new(0);
static HANDLER_SEQ: AtomicUsize = AtomicUsize::new(0);

fn fake_send_eoi(_irq: u8) {
    EOI_CALLS.fetch_add(1, Ordering::Relaxed);
    EOI_SEQ.store(CALL_SEQ.fetch_add(1, Ordering::Relaxed) + 1, Ordering::Relaxed);
}

fn fake_mask_line(_irq: u8) -> i32 {
    0
}

fn fake_unmask_line(_irq: u8) -> i32 {
    0
}

fn fake_rsdp_available() -> bool {
    false
}

fn fake_rsdp_address() -> *const c_void {
    ptr::null()
}

static FAKE_PLATFORM: PlatformServices = PlatformServices {
    irq_send_eoi: fake_send_eoi,
    irq_mask_line: fake_mask_line,
    irq_unmask_line: fake_unmask_line,
    is_rsdp_available: fake_rsdp_available,
    get_rsdp_address: fake_rsdp_address,
};

extern "C" fn recording_handler(_irq: u8, _frame: *mut InterruptFrame, _context: *mut c_void) {
    HANDLER_CALLS.fetch_add(1, Ordering::Relaxed);
    HANDLER_SEQ.store(CALL_SEQ.fetch_add(1, Ordering::Relaxed) + 1, Ordering::Relaxed);
}

fn reset_recorders() {
    CALL_SEQ.store(0, Ordering::Relaxed);
    EOI_CALLS.store(0, Ordering::Relaxed);
    EOI_SEQ.store(0, Ordering::Relaxed);
    HANDLER_CALLS.store(0, Ordering::Relaxed);
    HANDLER_SEQ.store(0, Ordering::Relaxed);
}

fn setup() {
    register_platform_services(&FAKE_PLATFORM);
    irq::init();
    reset_recorders();
}

fn irq_frame(vector: u8) -> InterruptFrame {
    let mut frame: InterruptFrame = unsafe { core::mem::zeroed() };
    frame.vector = vector as u64;
    frame
}

pub fn test_dispatch_acks_exactly_once_before_handler() -> TestResult {
    setup();
    if irq::register_handler(3, Some(recording_handler), ptr::null_mut()) != 0 {
        return fail!("handler registration failed");
    }

    let mut frame = irq_frame(IRQ_BASE_VECTOR + 3);
    irq::irq_dispatch(&mut frame);

    assert_eq_test!(EOI_CALLS.load(Ordering::Relaxed), 1, "exactly one EOI");
    assert_eq_test!(
        HANDLER_CALLS.load(Ordering::Relaxed),
        1,
        "exactly one handler call"
    );
    let eoi_seq = EOI_SEQ.load(Ordering::Relaxed);
    let handler_seq = HANDLER_SEQ.load(Ordering::Relaxed);
    assert_test!(eoi_seq != 0 && handler_seq != 0);
    assert_test!(eoi_seq < handler_seq, "EOI must precede the handler");

    irq::unregister_handler(3);
    pass!()
}

pub fn test_dispatch_unhandled_line_acks_and_masks() -> TestResult {
    setup();
    let mut frame = irq_frame(IRQ_BASE_VECTOR + 5);
    irq::irq_dispatch(&mut frame);

    assert_eq_test!(EOI_CALLS.load(Ordering::Relaxed), 1, "unhandled IRQ still acked");
    assert_eq_test!(HANDLER_CALLS.load(Ordering::Relaxed), 0);
    assert_test!(irq::is_masked(5), "unhandled line must be masked");
    pass!()
}

pub fn test_dispatch_ignores_non_irq_vector() -> TestResult {
    setup();
    let mut frame = irq_frame(IRQ_BASE_VECTOR - 1);
    irq::irq_dispatch(&mut frame);

    assert_eq_test!(EOI_CALLS.load(Ordering::Relaxed), 0, "exception vectors get no EOI");
    assert_eq_test!(HANDLER_CALLS.load(Ordering::Relaxed), 0);
    pass!()
}

pub fn test_dispatch_null_frame() -> TestResult {
    setup();
    irq::irq_dispatch(ptr::null_mut());
    assert_eq_test!(EOI_CALLS.load(Ordering::Relaxed), 0);
    pass!()
}

pub fn test_register_invalid_line() -> TestResult {
    setup();
    assert_test!(
        irq::register_handler(255, Some(recording_handler), ptr::null_mut()) != 0,
        "line 255 must be rejected"
    );
    assert_test!(
        irq::register_handler(IRQ_LINES as u8, Some(recording_handler), ptr::null_mut()) != 0,
        "line at the boundary must be rejected"
    );
    pass!()
}

pub fn test_unregister_never_registered() -> TestResult {
    setup();
    irq::unregister_handler(7);
    irq::unregister_handler(7);
    pass!()
}

pub fn test_stats_track_dispatch_count() -> TestResult {
    setup();
    if irq::register_handler(4, Some(recording_handler), ptr::null_mut()) != 0 {
        return fail!("handler registration failed");
    }

    let mut frame = irq_frame(IRQ_BASE_VECTOR + 4);
    irq::irq_dispatch(&mut frame);
    irq::irq_dispatch(&mut frame);

    let mut stats = IrqStats {
        count: 0,
        last_timestamp: 0,
    };
    assert_eq_test!(irq::get_stats(4, &mut stats), 0);
    assert_eq_test!(stats.count, 2);
    assert_test!(stats.last_timestamp != 0);

    irq::unregister_handler(4);
    pass!()
}

pub fn test_stats_invalid_line() -> TestResult {
    setup();
    let mut stats = IrqStats {
        count: 0xDEAD,
        last_timestamp: 0xBEEF,
    };
    assert_test!(irq::get_stats(255, &mut stats) != 0);
    assert_test!(irq::get_stats(IRQ_LINES as u8, &mut stats) != 0);
    assert_test!(irq::get_stats(0, ptr::null_mut()) != 0);
    pass!()
}

pub fn test_mask_unmask_roundtrip() -> TestResult {
    setup();
    assert_test!(irq::is_masked(6), "lines start masked");
    irq::enable_line(6);
    assert_test!(!irq::is_masked(6));
    irq::disable_line(6);
    assert_test!(irq::is_masked(6));
    assert_test!(irq::is_masked(255), "out-of-range lines read as masked");
    pass!()
}

pub fn run_all() -> c_int {
    let mut failed = 0u32;
    let mut total = 0u32;

    run_test!(failed, total, test_dispatch_acks_exactly_once_before_handler);
    run_test!(failed, total, test_dispatch_unhandled_line_acks_and_masks);
    run_test!(failed, total, test_dispatch_ignores_non_irq_vector);
    run_test!(failed, total, test_dispatch_null_frame);
    run_test!(failed, total, test_register_invalid_line);
    run_test!(failed, total, test_unregister_never_registered);
    run_test!(failed, total, test_stats_track_dispatch_count);
    run_test!(failed, total, test_stats_invalid_line);
    run_test!(failed, total, test_mask_unmask_roundtrip);

    klog_info!("IRQ tests: {}/{} passed", total - failed, total);
    if failed == 0 { 0 } else { -1 }
}
