//! Driver-layer tests that run without touching live hardware: bounds
//! checks, state consistency, and the ACPI discovery guard.

use core::ffi::c_int;

use ember_lib::testing::TestResult;
use ember_lib::{assert_eq_test, assert_test, klog_info, pass, run_test, skip};

use crate::{apic, pic, platform_init};

pub fn test_pic_mask_rejects_out_of_range() -> TestResult {
    assert_eq_test!(pic::mask_line(16), -1, "mask of line 16 must be rejected");
    assert_eq_test!(pic::mask_line(0xFF), -1, "mask of line 255 must be rejected");
    pass!()
}

pub fn test_pic_unmask_rejects_out_of_range() -> TestResult {
    assert_eq_test!(pic::unmask_line(16), -1, "unmask of line 16 must be rejected");
    pass!()
}

pub fn test_apic_eoi_noop_when_disabled() -> TestResult {
    if apic::is_enabled() {
        return skip!("APIC already enabled on this machine");
    }
    // Must not fault: the EOI path has to be safe to call before (or
    // without) APIC bring-up.
    apic::send_eoi();
    pass!()
}

pub fn test_apic_enabled_implies_available() -> TestResult {
    if apic::is_enabled() {
        assert_test!(
            apic::is_available(),
            "enabled APIC must also report available"
        );
    }
    pass!()
}

pub fn test_acpi_tables_guarded_by_bringup() -> TestResult {
    if platform_init::is_ready() {
        return skip!("platform already brought up");
    }
    assert_test!(
        platform_init::acpi_tables().is_none(),
        "table discovery must refuse to run before bring-up"
    );
    pass!()
}

pub fn run_all() -> c_int {
    let mut failed = 0u32;
    let mut total = 0u32;

    run_test!(failed, total, test_pic_mask_rejects_out_of_range);
    run_test!(failed, total, test_pic_unmask_rejects_out_of_range);
    run_test!(failed, total, test_apic_eoi_noop_when_disabled);
    run_test!(failed, total, test_apic_enabled_implies_available);
    run_test!(failed, total, test_acpi_tables_guarded_by_bringup);

    klog_info!("Platform tests: {}/{} passed", total - failed, total);
    if failed == 0 { 0 } else { -1 }
}
