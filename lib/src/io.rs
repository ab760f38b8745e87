//! Typed x86 port I/O.
//!
//! `Port<T>` is a const-constructible handle to a fixed I/O port, so the
//! well-known ports can live in `const` tables (see [`crate::ports`]).  The
//! actual `in`/`out` instructions come from the `x86_64` crate's
//! [`PortRead`]/[`PortWrite`] primitives.

use core::marker::PhantomData;

use x86_64::instructions::port::{PortRead, PortWrite};

/// A typed I/O port at a fixed address.
pub struct Port<T> {
    port: u16,
    _access: PhantomData<T>,
}

impl<T> Clone for Port<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Port<T> {}

impl<T> Port<T> {
    #[inline]
    pub const fn new(port: u16) -> Self {
        Self {
            port,
            _access: PhantomData,
        }
    }

    /// The raw port address.
    #[inline]
    pub const fn address(self) -> u16 {
        self.port
    }

    /// A port at `address() + off` with the same access width.
    ///
    /// Used for register banks addressed relative to a base port (UARTs).
    #[inline]
    pub const fn offset(self, off: u16) -> Self {
        Self::new(self.port + off)
    }
}

impl<T: PortRead> Port<T> {
    /// # Safety
    ///
    /// Port I/O.  The caller must know the port is safe to read and that
    /// the read has no side effects it cannot tolerate.
    #[inline(always)]
    pub unsafe fn read(self) -> T {
        unsafe { T::read_from_port(self.port) }
    }
}

impl<T: PortWrite> Port<T> {
    /// # Safety
    ///
    /// Port I/O.  The caller must know the side effects of writing `value`
    /// to this port.
    #[inline(always)]
    pub unsafe fn write(self, value: T) {
        unsafe { T::write_to_port(self.port, value) }
    }
}
