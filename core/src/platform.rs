use core::ffi::c_void;

ember_lib::define_service! {
    /// Platform hardware abstraction layer.
    ///
    /// Registered once during platform bring-up by the `drivers` crate,
    /// which has visibility into the concrete interrupt-controller
    /// implementations.  Keeps the one-way dependency: drivers -> core.
    platform => PlatformServices {
        // -- IRQ dispatch ---------------------------------------------------
        irq_send_eoi(irq: u8);
        irq_mask_line(irq: u8) -> i32;
        irq_unmask_line(irq: u8) -> i32;

        // -- ACPI -----------------------------------------------------------
        is_rsdp_available() -> bool;
        get_rsdp_address() -> *const c_void;
    }
}
