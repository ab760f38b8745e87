//! Table integrity tests - synthetic firmware tables built on the stack.

use core::ffi::c_int;
use core::mem;
use core::ptr;

use ember_lib::testing::TestResult;
use ember_lib::{assert_eq_test, assert_ne_test, assert_test, hhdm, klog_info, pass, run_test, skip};

use crate::tables::{Rsdp, RSDP_V1_LENGTH, SdtHeader, AcpiTables, checksum, validate_rsdp, validate_table};

/// A header plus a small body, sized like a real (tiny) description table.
#[repr(C)]
struct TestTable {
    header: SdtHeader,
    body: [u8; 8],
}

const TEST_TABLE_LEN: u32 = (mem::size_of::<SdtHeader>() + 8) as u32;

/// Build a table whose declared region checksums to zero.
fn make_valid_table() -> TestTable {
    let mut table = TestTable {
        header: SdtHeader {
            signature: *b"EMBR",
            length: TEST_TABLE_LEN,
            revision: 1,
            checksum: 0,
            oem_id: *b"EMBER ",
            oem_table_id: *b"EMBRTEST",
            oem_revision: 1,
            creator_id: 0x4545,
            creator_revision: 1,
        },
        body: [0xA5, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07],
    };
    let sum = checksum(
        &table as *const TestTable as *const u8,
        TEST_TABLE_LEN as usize,
    );
    table.header.checksum = sum.wrapping_neg();
    table
}

pub fn test_checksum_zero_sum() -> TestResult {
    // 0x10 + 0x20 + 0x30 + 0xA0 = 0x100, zero modulo 256.
    let bytes: [u8; 4] = [0x10, 0x20, 0x30, 0xA0];
    assert_eq_test!(checksum(bytes.as_ptr(), bytes.len()), 0);
    pass!()
}

pub fn test_checksum_nonzero_sum() -> TestResult {
    // Same region with the last byte bumped: 0x101, not a multiple of 256.
    let bytes: [u8; 4] = [0x10, 0x20, 0x30, 0xA1];
    assert_ne_test!(checksum(bytes.as_ptr(), bytes.len()), 0);
    pass!()
}

pub fn test_checksum_empty_region() -> TestResult {
    // Zero-length regions sum to zero; rejecting empty tables is the
    // caller's policy, not the checksum's.
    let bytes: [u8; 1] = [0xFF];
    assert_eq_test!(checksum(bytes.as_ptr(), 0), 0);
    pass!()
}

pub fn test_checksum_idempotent() -> TestResult {
    let table = make_valid_table();
    let base = &table as *const TestTable as *const u8;
    let first = checksum(base, TEST_TABLE_LEN as usize);
    for _ in 0..3 {
        assert_eq_test!(checksum(base, TEST_TABLE_LEN as usize), first);
    }
    pass!()
}

pub fn test_checksum_byte_flip_and_compensate() -> TestResult {
    let mut table = make_valid_table();
    assert_test!(validate_table(&table.header), "fresh table must validate");

    // Any single-byte change must flip the verdict...
    table.body[2] ^= 0x5A;
    assert_test!(
        !validate_table(&table.header),
        "corrupted table must not validate"
    );

    // ...and a compensating change elsewhere must restore it.
    let residue = checksum(
        &table as *const TestTable as *const u8,
        TEST_TABLE_LEN as usize,
    );
    table.body[7] = table.body[7].wrapping_sub(residue);
    assert_test!(
        validate_table(&table.header),
        "compensated table must validate again"
    );
    pass!()
}

pub fn test_validate_table_rejects_null() -> TestResult {
    assert_test!(!validate_table(ptr::null()));
    pass!()
}

pub fn test_validate_table_rejects_short_length() -> TestResult {
    let mut table = make_valid_table();
    // Declared extent smaller than the header itself can never be trusted,
    // even though a zero-length region trivially checksums to zero.
    table.header.length = 0;
    assert_test!(!validate_table(&table.header));
    table.header.length = mem::size_of::<SdtHeader>() as u32 - 1;
    assert_test!(!validate_table(&table.header));
    pass!()
}

pub fn test_validate_table_detects_corruption() -> TestResult {
    let mut table = make_valid_table();
    assert_test!(validate_table(&table.header));
    table.header.oem_revision = table.header.oem_revision.wrapping_add(1);
    assert_test!(!validate_table(&table.header));
    pass!()
}

fn make_valid_rsdp(revision: u8) -> Rsdp {
    let mut rsdp: Rsdp = unsafe { mem::zeroed() };
    rsdp.signature = *b"RSD PTR ";
    rsdp.oem_id = *b"EMBER ";
    rsdp.revision = revision;
    rsdp.rsdt_address = 0xDEAD_0000;
    if revision >= 2 {
        rsdp.length = mem::size_of::<Rsdp>() as u32;
        rsdp.xsdt_address = 0xDEAD_BEEF_0000;
    }
    let base = &rsdp as *const Rsdp as *const u8;
    rsdp.checksum = checksum(base, RSDP_V1_LENGTH).wrapping_neg();
    if revision >= 2 {
        rsdp.extended_checksum = checksum(base, mem::size_of::<Rsdp>()).wrapping_neg();
    }
    rsdp
}

pub fn test_validate_rsdp_v1() -> TestResult {
    let rsdp = make_valid_rsdp(0);
    assert_test!(validate_rsdp(&rsdp));
    pass!()
}

pub fn test_validate_rsdp_v2() -> TestResult {
    let rsdp = make_valid_rsdp(2);
    assert_test!(validate_rsdp(&rsdp));
    pass!()
}

pub fn test_validate_rsdp_rejects_corruption() -> TestResult {
    assert_test!(!validate_rsdp(ptr::null()));

    let mut rsdp = make_valid_rsdp(0);
    rsdp.rsdt_address = rsdp.rsdt_address.wrapping_add(1);
    assert_test!(!validate_rsdp(&rsdp), "v1 checksum must catch corruption");

    let mut rsdp = make_valid_rsdp(2);
    rsdp.xsdt_address = rsdp.xsdt_address.wrapping_add(1);
    assert_test!(
        !validate_rsdp(&rsdp),
        "extended checksum must catch corruption past byte 20"
    );
    pass!()
}

pub fn test_from_rsdp_requires_hhdm() -> TestResult {
    if hhdm::is_available() {
        // Table walking needs phys->virt translation; with a live HHDM this
        // case is covered by real discovery instead.
        return skip!("HHDM already initialized");
    }
    let rsdp = make_valid_rsdp(2);
    assert_test!(AcpiTables::from_rsdp(&rsdp).is_none());
    pass!()
}

pub fn run_all() -> c_int {
    let mut failed = 0u32;
    let mut total = 0u32;

    run_test!(failed, total, test_checksum_zero_sum);
    run_test!(failed, total, test_checksum_nonzero_sum);
    run_test!(failed, total, test_checksum_empty_region);
    run_test!(failed, total, test_checksum_idempotent);
    run_test!(failed, total, test_checksum_byte_flip_and_compensate);
    run_test!(failed, total, test_validate_table_rejects_null);
    run_test!(failed, total, test_validate_table_rejects_short_length);
    run_test!(failed, total, test_validate_table_detects_corruption);
    run_test!(failed, total, test_validate_rsdp_v1);
    run_test!(failed, total, test_validate_rsdp_v2);
    run_test!(failed, total, test_validate_rsdp_rejects_corruption);
    run_test!(failed, total, test_from_rsdp_requires_hhdm);

    klog_info!("ACPI tests: {}/{} passed", total - failed, total);
    if failed == 0 { 0 } else { -1 }
}
