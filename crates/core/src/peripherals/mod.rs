//! AVR peripheral emulation.
//!
//! Only the EEPROM controller is modelled:
//!
//! - [`EepromCtrl`] — EECR/EEDR/EEAR register interface over an [`Eeprom`](crate::Eeprom)

mod eeprom;

pub use eeprom::EepromCtrl;

// EEPROM I/O register addresses (data space), ATmega family layout.
// ATtiny parts map the same registers three bytes lower; the emulation
// uses the ATmega map for every chip.
pub const EECR: u16 = 0x3F;
pub const EEDR: u16 = 0x40;
pub const EEARL: u16 = 0x41;
pub const EEARH: u16 = 0x42;

/// Resolve an EEPROM register address to its name.
pub fn io_name(addr: u16) -> Option<&'static str> {
    match addr {
        EECR => Some("EECR"),
        EEDR => Some("EEDR"),
        EEARL => Some("EEARL"),
        EEARH => Some("EEARH"),
        _ => None,
    }
}
