#![no_std]

pub mod irq;
pub mod irq_tests;
pub mod platform;
