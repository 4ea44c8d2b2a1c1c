//! Byte-addressable storage device abstraction.
//!
//! Every EEPROM backend in this crate (the in-memory [`Eeprom`](crate::Eeprom),
//! the register-level [`EepromCtrl`](crate::peripherals::EepromCtrl), and the
//! [`TraceStorage`](crate::trace::TraceStorage) wrapper) exposes the same two
//! blocking single-byte primitives. The generic value routines in
//! [`generic`](crate::generic) are written against this trait only.

/// A byte-addressable non-volatile storage device.
///
/// Both primitives block until the hardware operation completes. Neither
/// reports failure: addresses at or beyond [`capacity`](Self::capacity) do
/// whatever the device does (wrap, drop, or return erased bytes).
pub trait EepromStorage {
    /// Physical size of the device in bytes.
    fn capacity(&self) -> usize;

    /// Read one byte. Takes `&mut self` because real controllers sequence
    /// registers on reads as well as writes.
    fn read_byte(&mut self, addr: usize) -> u8;

    /// Write one byte.
    fn write_byte(&mut self, addr: usize, value: u8);
}

impl<S: EepromStorage + ?Sized> EepromStorage for &mut S {
    #[inline]
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    #[inline]
    fn read_byte(&mut self, addr: usize) -> u8 {
        (**self).read_byte(addr)
    }

    #[inline]
    fn write_byte(&mut self, addr: usize, value: u8) {
        (**self).write_byte(addr, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Cells([u8; 4]);

    impl EepromStorage for Cells {
        fn capacity(&self) -> usize { self.0.len() }
        fn read_byte(&mut self, addr: usize) -> u8 { self.0[addr] }
        fn write_byte(&mut self, addr: usize, value: u8) { self.0[addr] = value; }
    }

    fn poke<S: EepromStorage>(mut s: S) {
        s.write_byte(2, 0xAB);
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut cells = Cells([0; 4]);
        poke(&mut cells);
        assert_eq!(cells.0, [0, 0, 0xAB, 0]);
    }

    #[test]
    fn test_trait_object() {
        let mut cells = Cells([1, 2, 3, 4]);
        let dev: &mut dyn EepromStorage = &mut cells;
        assert_eq!(dev.capacity(), 4);
        assert_eq!(dev.read_byte(3), 4);
    }
}
