//! # eeprom-core
//!
//! Typed persistence of plain-data values in AVR EEPROM (v0.2.0).
//!
//! The heart of the crate is two generic routines that copy a value's raw
//! in-memory bytes to and from a byte-addressable EEPROM, one cell at a time:
//! [`write_value`] and [`read_value`]. There is no framing, no checksum, no
//! type tag, and no bounds check. What goes in is exactly `size_of::<T>()`
//! native-order bytes.
//!
//! ## Architecture
//!
//! - [`EepromStorage`] — Blocking single-byte read/write device interface
//! - [`generic`] — `write_value` / `read_value` / `update_value` over any storage
//! - [`Eeprom`] — In-memory EEPROM with erased state, dirty flag, and wear counters
//! - [`peripherals`] — EECR/EEDR/EEAR register-level EEPROM controller
//! - [`trace`] — Access log and address watchpoints over any storage
//! - [`hex`] — Intel HEX (`.eep`) reader and writer
//! - [`image`] — Raw / Intel HEX / compressed snapshot image files
//! - [`inspect`] — Hex dump, diff, and used-range views
//!
//! ## Example
//!
//! ```
//! use eeprom_core::{Chip, Eeprom, read_value, write_value};
//! use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
//!
//! #[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Debug, PartialEq)]
//! #[repr(C)]
//! struct Setting {
//!     channel: u8,
//!     volume: u8,
//! }
//!
//! let mut eeprom = Eeprom::for_chip(Chip::Atmega328p);
//! assert_eq!(write_value(&mut eeprom, 10, &Setting { channel: 3, volume: 40 }), 2);
//!
//! let mut out = Setting { channel: 0, volume: 0 };
//! assert_eq!(read_value(&mut eeprom, 10, &mut out), 2);
//! assert_eq!(out, Setting { channel: 3, volume: 40 });
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod error;
pub mod generic;
pub mod hex;
pub mod image;
pub mod inspect;
pub mod memory;
pub mod peripherals;
pub mod storage;
pub mod trace;

pub use error::{Error, Result};
pub use generic::{get, read_value, update_value, write_value, EepromValue};
pub use image::{load_image, save_image, ImageFormat};
pub use memory::Eeprom;
pub use storage::EepromStorage;

/// EEPROM size: 1 KB (ATmega32u4, ATmega328P)
pub const EEPROM_SIZE: usize = 1024;
/// EEPROM size: 4 KB (ATmega2560)
pub const EEPROM_SIZE_2560: usize = 4 * 1024;
/// EEPROM size: 512 bytes (ATtiny85)
pub const EEPROM_SIZE_TINY85: usize = 512;

/// Target microcontroller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chip {
    /// ATmega32u4 (Arduboy, Leonardo, Micro)
    #[default]
    #[serde(alias = "32u4")]
    Atmega32u4,
    /// ATmega328P (Uno, Nano, Gamebuino Classic)
    #[serde(alias = "328p")]
    Atmega328p,
    /// ATmega2560 (Mega 2560)
    #[serde(alias = "2560")]
    Atmega2560,
    /// ATtiny85 (Digispark, Trinket)
    #[serde(alias = "tiny85")]
    Attiny85,
}

impl Chip {
    pub const ALL: [Chip; 4] = [Chip::Atmega32u4, Chip::Atmega328p, Chip::Atmega2560, Chip::Attiny85];

    /// EEPROM capacity in bytes.
    pub fn eeprom_size(self) -> usize {
        match self {
            Chip::Atmega32u4 | Chip::Atmega328p => EEPROM_SIZE,
            Chip::Atmega2560 => EEPROM_SIZE_2560,
            Chip::Attiny85 => EEPROM_SIZE_TINY85,
        }
    }

    /// Stable one-byte id used in snapshot headers.
    pub fn id(self) -> u8 {
        match self {
            Chip::Atmega32u4 => 0,
            Chip::Atmega328p => 1,
            Chip::Atmega2560 => 2,
            Chip::Attiny85 => 3,
        }
    }

    pub fn from_id(id: u8) -> Option<Chip> {
        Chip::ALL.into_iter().find(|c| c.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            Chip::Atmega32u4 => "ATmega32u4",
            Chip::Atmega328p => "ATmega328P",
            Chip::Atmega2560 => "ATmega2560",
            Chip::Attiny85 => "ATtiny85",
        }
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Chip {
    type Err = Error;

    /// Accepts full part names or the short suffix, case-insensitively:
    /// `ATmega32u4`, `32u4`, `atmega328p`, `328P`, `2560`, `tiny85`.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let short = lower
            .strip_prefix("atmega")
            .or_else(|| lower.strip_prefix("at"))
            .unwrap_or(&lower);
        match short {
            "32u4" => Ok(Chip::Atmega32u4),
            "328p" => Ok(Chip::Atmega328p),
            "2560" => Ok(Chip::Atmega2560),
            "tiny85" => Ok(Chip::Attiny85),
            _ => Err(Error::UnknownChip(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chip_sizes() {
        assert_eq!(Chip::Atmega32u4.eeprom_size(), 1024);
        assert_eq!(Chip::Atmega328p.eeprom_size(), 1024);
        assert_eq!(Chip::Atmega2560.eeprom_size(), 4096);
        assert_eq!(Chip::Attiny85.eeprom_size(), 512);
    }

    #[test]
    fn test_chip_parse() {
        assert_eq!("ATmega32u4".parse::<Chip>().unwrap(), Chip::Atmega32u4);
        assert_eq!("328P".parse::<Chip>().unwrap(), Chip::Atmega328p);
        assert_eq!("atmega2560".parse::<Chip>().unwrap(), Chip::Atmega2560);
        assert_eq!("ATtiny85".parse::<Chip>().unwrap(), Chip::Attiny85);
        assert_eq!("tiny85".parse::<Chip>().unwrap(), Chip::Attiny85);
        assert!(matches!("pic16".parse::<Chip>(), Err(Error::UnknownChip(_))));
    }

    #[test]
    fn test_chip_id_roundtrip() {
        for chip in Chip::ALL {
            assert_eq!(Chip::from_id(chip.id()), Some(chip));
            assert_eq!(chip.to_string().parse::<Chip>().unwrap(), chip);
        }
        assert_eq!(Chip::from_id(200), None);
    }
}
