//! Typed access to EEPROM cells from the command line.
//!
//! Each [`ValueKind`] maps to one Rust primitive; the byte transfer itself is
//! done by the generic `read_value` / `write_value` routines.

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use eeprom_core::{read_value, update_value, write_value, EepromStorage, EepromValue};

/// Primitive type stored at an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

/// Invoke `$body` with `$t` bound to the Rust type for `$kind`.
macro_rules! with_type {
    ($kind:expr, $t:ident => $body:expr) => {
        match $kind {
            ValueKind::U8 => { type $t = u8; $body }
            ValueKind::I8 => { type $t = i8; $body }
            ValueKind::U16 => { type $t = u16; $body }
            ValueKind::I16 => { type $t = i16; $body }
            ValueKind::U32 => { type $t = u32; $body }
            ValueKind::I32 => { type $t = i32; $body }
            ValueKind::U64 => { type $t = u64; $body }
            ValueKind::I64 => { type $t = i64; $body }
            ValueKind::F32 => { type $t = f32; $body }
            ValueKind::F64 => { type $t = f64; $body }
        }
    };
}

impl ValueKind {
    /// Storage size in bytes.
    pub fn size(self) -> usize {
        with_type!(self, T => std::mem::size_of::<T>())
    }
}

/// Parse `text` as `kind` and store it at `addr`. Returns bytes transferred.
///
/// Integers accept decimal or `0x`-prefixed hex.
pub fn store<S: EepromStorage>(storage: &mut S, addr: usize, kind: ValueKind, text: &str, update: bool) -> Result<usize> {
    with_type!(kind, T => {
        let value: T = parse_text(text)?;
        Ok(put(storage, addr, &value, update))
    })
}

/// Read a value of `kind` at `addr` and format it for display.
pub fn load<S: EepromStorage>(storage: &mut S, addr: usize, kind: ValueKind) -> String {
    with_type!(kind, T => {
        let mut value = T::default();
        read_value(storage, addr, &mut value);
        value.to_string()
    })
}

fn put<S: EepromStorage, T: EepromValue>(storage: &mut S, addr: usize, value: &T, update: bool) -> usize {
    if update {
        update_value(storage, addr, value)
    } else {
        write_value(storage, addr, value)
    }
}

fn parse_text<T: ParseValue>(text: &str) -> Result<T> {
    T::parse_value(text.trim()).ok_or_else(|| anyhow!("cannot parse {:?} as {}", text, std::any::type_name::<T>()))
}

trait ParseValue: Sized {
    fn parse_value(s: &str) -> Option<Self>;
}

macro_rules! impl_parse_int {
    ($($t:ty),*) => {
        $(
            impl ParseValue for $t {
                fn parse_value(s: &str) -> Option<Self> {
                    let (neg, digits) = match s.strip_prefix('-') {
                        Some(rest) => (true, rest),
                        None => (false, s),
                    };
                    if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
                        if neg { return None; }
                        <$t>::from_str_radix(hex, 16).ok()
                    } else {
                        s.parse().ok()
                    }
                }
            }
        )*
    };
}

impl_parse_int!(u8, i8, u16, i16, u32, i32, u64, i64);

macro_rules! impl_parse_float {
    ($($t:ty),*) => {
        $(
            impl ParseValue for $t {
                fn parse_value(s: &str) -> Option<Self> {
                    s.parse().ok()
                }
            }
        )*
    };
}

impl_parse_float!(f32, f64);

/// Parse an address: decimal or `0x`-prefixed hex.
pub fn parse_addr(s: &str) -> Result<usize, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).map_err(|e| format!("bad hex address {:?}: {}", s, e))
    } else {
        s.parse().map_err(|e| format!("bad address {:?}: {}", s, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eeprom_core::{Chip, Eeprom};

    #[test]
    fn test_sizes() {
        assert_eq!(ValueKind::U8.size(), 1);
        assert_eq!(ValueKind::I16.size(), 2);
        assert_eq!(ValueKind::F32.size(), 4);
        assert_eq!(ValueKind::U64.size(), 8);
    }

    #[test]
    fn test_store_and_load() {
        let mut eeprom = Eeprom::for_chip(Chip::Atmega32u4);
        assert_eq!(store(&mut eeprom, 0, ValueKind::I32, "1234", false).unwrap(), 4);
        assert_eq!(load(&mut eeprom, 0, ValueKind::I32), "1234");
        assert_eq!(store(&mut eeprom, 8, ValueKind::U16, "0xBEEF", true).unwrap(), 2);
        assert_eq!(load(&mut eeprom, 8, ValueKind::U16), "48879");
        assert_eq!(store(&mut eeprom, 16, ValueKind::F32, "-2.5", false).unwrap(), 4);
        assert_eq!(load(&mut eeprom, 16, ValueKind::F32), "-2.5");
    }

    #[test]
    fn test_erased_reads() {
        let mut eeprom = Eeprom::new(16);
        assert_eq!(load(&mut eeprom, 0, ValueKind::U8), "255");
        assert_eq!(load(&mut eeprom, 0, ValueKind::I16), "-1");
    }

    #[test]
    fn test_parse_errors() {
        let mut eeprom = Eeprom::new(16);
        assert!(store(&mut eeprom, 0, ValueKind::U8, "256", false).is_err());
        assert!(store(&mut eeprom, 0, ValueKind::U8, "-0x1", false).is_err());
        assert!(store(&mut eeprom, 0, ValueKind::I8, "-128", false).is_ok());
        assert!(store(&mut eeprom, 0, ValueKind::F64, "abc", false).is_err());
        assert_eq!(eeprom.total_writes(), 1);
    }

    #[test]
    fn test_parse_addr() {
        assert_eq!(parse_addr("16"), Ok(16));
        assert_eq!(parse_addr("0x3FF"), Ok(0x3FF));
        assert!(parse_addr("0xZZ").is_err());
        assert!(parse_addr("-1").is_err());
    }
}
