//! ACPI table integrity validation and discovery for EmberOS.
//!
//! Firmware hands the kernel a hierarchy of system description tables rooted
//! at the RSDP.  Before anything trusts a table's contents, its declared
//! byte extent must sum to zero modulo 256, the sole structural integrity
//! check ACPI gives us.  This crate owns that trust boundary:
//!
//! - [`tables::checksum`] / [`tables::validate_table`] /
//!   [`tables::validate_rsdp`]: the integrity predicates.
//! - [`tables::AcpiTables`]: validated handle for looking tables up by
//!   signature via the XSDT/RSDT.
//!
//! Interpreting individual tables (MADT, HPET, ...) is out of scope here;
//! consumers get back a checksum-validated [`tables::SdtHeader`] pointer and
//! take it from there.

#![no_std]
#![allow(unsafe_op_in_unsafe_fn)]

pub mod tables;
pub mod tables_tests;
