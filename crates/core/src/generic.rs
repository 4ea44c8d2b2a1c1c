//! Typed values over raw EEPROM bytes.
//!
//! [`write_value`] and [`read_value`] copy the in-memory representation of a
//! plain-data value to and from consecutive storage cells, one storage call
//! per byte, in increasing address order. Nothing else is stored: no length,
//! no type tag, no checksum, and bytes are in native order. A value read back
//! is only meaningful if it was written by code with the same layout for `T`.
//!
//! Neither routine checks the address range against the device capacity.
//! Out-of-range cells behave however the backing [`EepromStorage`] handles
//! them, and the byte count returned is always `size_of::<T>()`.
//!
//! ```
//! use eeprom_core::{Eeprom, read_value, write_value};
//!
//! let mut eeprom = Eeprom::new(1024);
//! assert_eq!(write_value(&mut eeprom, 0, &1234i32), 4);
//!
//! let mut out = 0i32;
//! assert_eq!(read_value(&mut eeprom, 0, &mut out), 4);
//! assert_eq!(out, 1234);
//! ```

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::EepromStorage;

/// Values that can be persisted as their raw bytes.
///
/// Blanket-implemented for every type that is valid for any bit pattern and
/// has no padding, i.e. anything deriving zerocopy's `FromBytes`, `IntoBytes`,
/// `Immutable` and `KnownLayout`.
pub trait EepromValue
where
    Self: FromBytes + IntoBytes + Immutable + KnownLayout,
{
}

impl<T> EepromValue for T where T: FromBytes + IntoBytes + Immutable + KnownLayout {}

/// Copy `value`'s bytes into storage starting at `addr`.
///
/// Returns the number of bytes written, which is always `size_of::<T>()`.
pub fn write_value<S, T>(storage: &mut S, addr: usize, value: &T) -> usize
where
    S: EepromStorage + ?Sized,
    T: EepromValue,
{
    let bytes = value.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        storage.write_byte(addr.wrapping_add(i), b);
    }
    bytes.len()
}

/// Overwrite `value` with bytes read from storage starting at `addr`.
///
/// Returns the number of bytes read, which is always `size_of::<T>()`.
/// Never-written cells read as whatever the device holds (0xFF when erased).
pub fn read_value<S, T>(storage: &mut S, addr: usize, value: &mut T) -> usize
where
    S: EepromStorage + ?Sized,
    T: EepromValue,
{
    let bytes = value.as_mut_bytes();
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = storage.read_byte(addr.wrapping_add(i));
    }
    bytes.len()
}

/// Like [`write_value`], but skips cells that already hold the right byte.
///
/// Each cell is read before it is written, so an unchanged value costs no
/// write cycles. Returns `size_of::<T>()` regardless of how many cells
/// actually changed.
pub fn update_value<S, T>(storage: &mut S, addr: usize, value: &T) -> usize
where
    S: EepromStorage + ?Sized,
    T: EepromValue,
{
    let bytes = value.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        let a = addr.wrapping_add(i);
        if storage.read_byte(a) != b {
            storage.write_byte(a, b);
        }
    }
    bytes.len()
}

/// Read a value of type `T` from `addr`, starting from an all-zero value.
pub fn get<S, T>(storage: &mut S, addr: usize) -> T
where
    S: EepromStorage + ?Sized,
    T: EepromValue,
{
    let mut value = T::new_zeroed();
    read_value(storage, addr, &mut value);
    value
}
