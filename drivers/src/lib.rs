#![no_std]
#![allow(unsafe_op_in_unsafe_fn)]

pub mod apic;
pub mod apic_defs;
pub mod pic;
pub mod platform_init;
pub mod platform_tests;
pub mod serial;
