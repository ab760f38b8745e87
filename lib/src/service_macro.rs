//! The `define_service!` macro.
//!
//! Services decouple crates that *consume* a hardware capability from the
//! crate that *implements* it, without inverting the dependency graph: the
//! consumer declares a table of plain `fn` pointers, and bring-up code
//! registers the concrete implementations into a [`ServiceCell`].
//!
//! ```ignore
//! ember_lib::define_service! {
//!     /// Platform hardware abstraction.
//!     platform => PlatformServices {
//!         irq_send_eoi(irq: u8);
//!         irq_mask_line(irq: u8) -> i32;
//!     }
//! }
//!
//! // Generated: `PlatformServices`, `register_platform_services`,
//! // `platform_services`, and wrappers `irq_send_eoi`, `irq_mask_line`.
//! ```
//!
//! [`ServiceCell`]: crate::ServiceCell

#[macro_export]
macro_rules! define_service {
    (
        $(#[$meta:meta])*
        $name:ident => $services:ident {
            $(
                $op:ident ( $($arg:ident : $argty:ty),* $(,)? ) $(-> $ret:ty)? ;
            )*
        }
    ) => {
        $crate::paste::paste! {
            $(#[$meta])*
            #[derive(Clone, Copy)]
            pub struct $services {
                $( pub $op: fn($($argty),*) $(-> $ret)?, )*
            }

            static [<$name:upper _SERVICES>]: $crate::ServiceCell<$services> =
                $crate::ServiceCell::new();

            /// Install the service table.  The last registration wins.
            pub fn [<register_ $name _services>](services: &'static $services) {
                [<$name:upper _SERVICES>].register(services);
            }

            /// Whether a service table has been registered yet.
            #[inline]
            pub fn [<$name _services_registered>]() -> bool {
                [<$name:upper _SERVICES>].is_registered()
            }

            /// Access the registered service table.
            ///
            /// Panics if bring-up never registered one: calling a service
            /// before registration is an ordering bug, not a recoverable
            /// condition.
            #[inline(always)]
            pub fn [<$name _services>]() -> &'static $services {
                match [<$name:upper _SERVICES>].get() {
                    Some(services) => services,
                    None => panic!(concat!(
                        "service table '",
                        stringify!($name),
                        "' used before registration"
                    )),
                }
            }

            $(
                #[inline(always)]
                pub fn $op($($arg: $argty),*) $(-> $ret)? {
                    ([<$name _services>]().$op)($($arg),*)
                }
            )*
        }
    };
}
