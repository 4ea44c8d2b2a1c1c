//! EEPROM controller emulation.
//!
//! The AVR EEPROM is reached through four I/O registers:
//! EECR (0x3F), EEDR (0x40), EEARL (0x41), EEARH (0x42).
//!
//! A read sets EEAR, strobes EERE, then takes the byte from EEDR. A write
//! loads EEAR and EEDR, sets EEMPE (master write enable) together with the
//! EEPM programming mode, then sets EEPE in the next EECR write. EEPE without
//! an armed EEMPE is ignored, as on hardware.
//!
//! | EEPM1:0 | Operation                      |
//! |---------|--------------------------------|
//! | 00      | Erase and write (atomic)       |
//! | 01      | Erase only (cell becomes 0xFF) |
//! | 10      | Write only (`old & EEDR`)      |
//! | 11      | Reserved, treated as 00        |
//!
//! Programming completes instantly: EEPE is never observed set.

use super::{io_name, EEARH, EEARL, EECR, EEDR};
use crate::memory::ERASED;
use crate::{Chip, Eeprom, EepromStorage};

// EECR bits
const EERE: u8 = 0x01;
const EEPE: u8 = 0x02;
const EEMPE: u8 = 0x04;
const EERIE: u8 = 0x08;
const EEPM_MASK: u8 = 0x30;
const EEPM_SHIFT: u8 = 4;

/// EEPROM controller registers plus the cells they drive.
pub struct EepromCtrl {
    pub eecr: u8,
    pub eedr: u8,
    pub eear: u16,
    /// EEAR bits implemented by the part (higher bits read back as 0)
    addr_mask: u16,
    /// Completed erase/write operations
    pub commits: u64,
    mem: Eeprom,
}

impl EepromCtrl {
    pub fn new(chip: Chip) -> Self {
        Self::with_memory(Eeprom::for_chip(chip))
    }

    /// Wrap an existing EEPROM image.
    ///
    /// For power-of-two capacities EEAR is masked to the address width, so
    /// addresses wrap around. Other sizes keep all 16 bits and out-of-range
    /// cells behave as in [`Eeprom`].
    pub fn with_memory(mem: Eeprom) -> Self {
        let cap = mem.capacity();
        let addr_mask = if cap.is_power_of_two() && cap <= 0x1_0000 {
            (cap - 1) as u16
        } else {
            u16::MAX
        };
        EepromCtrl {
            eecr: 0,
            eedr: 0,
            eear: 0,
            addr_mask,
            commits: 0,
            mem,
        }
    }

    pub fn reset(&mut self) {
        self.eecr = 0;
        self.eedr = 0;
        self.eear = 0;
    }

    pub fn eeprom(&self) -> &Eeprom {
        &self.mem
    }

    pub fn eeprom_mut(&mut self) -> &mut Eeprom {
        &mut self.mem
    }

    pub fn into_eeprom(self) -> Eeprom {
        self.mem
    }

    /// Current programming mode (EEPM1:0).
    pub fn mode(&self) -> u8 {
        (self.eecr & EEPM_MASK) >> EEPM_SHIFT
    }

    pub fn read(&self, addr: u16) -> Option<u8> {
        match addr {
            EECR => Some(self.eecr),
            EEDR => Some(self.eedr),
            EEARL => Some(self.eear as u8),
            EEARH => Some((self.eear >> 8) as u8),
            _ => None,
        }
    }

    /// Returns true if addr was handled
    pub fn write(&mut self, addr: u16, value: u8) -> bool {
        match addr {
            EECR => self.write_eecr(value),
            EEDR => self.eedr = value,
            EEARL => self.eear = ((self.eear & 0xFF00) | value as u16) & self.addr_mask,
            EEARH => self.eear = ((self.eear & 0x00FF) | ((value as u16) << 8)) & self.addr_mask,
            _ => return false,
        }
        log::trace!("{} <- 0x{:02X}", io_name(addr).unwrap_or("?"), value);
        true
    }

    fn write_eecr(&mut self, value: u8) {
        let armed = self.eecr & EEMPE != 0;
        let ea = self.eear as usize;

        if value & EERE != 0 {
            self.eedr = self.mem.read_byte(ea);
        }

        if value & EEPE != 0 {
            if armed {
                let mode = (value & EEPM_MASK) >> EEPM_SHIFT;
                let cell = match mode {
                    0b01 => ERASED,
                    0b10 => self.mem.read_byte(ea) & self.eedr,
                    _ => self.eedr,
                };
                self.mem.write_byte(ea, cell);
                self.commits += 1;
            } else {
                log::debug!("EEPE at 0x{:04X} ignored: EEMPE not set", self.eear);
            }
            // EEMPE is consumed by the EEPE strobe
            self.eecr = value & (EERIE | EEPM_MASK);
        } else {
            self.eecr = value & (EEMPE | EERIE | EEPM_MASK);
        }
    }

    fn set_address(&mut self, addr: usize) {
        let a = addr as u16;
        self.write(EEARL, a as u8);
        self.write(EEARH, (a >> 8) as u8);
    }
}

/// Byte primitives run the same register sequences as avr-libc's
/// `eeprom_read_byte` / `eeprom_write_byte`. Only the low 16 address bits
/// reach EEAR.
impl EepromStorage for EepromCtrl {
    fn capacity(&self) -> usize {
        self.mem.capacity()
    }

    fn read_byte(&mut self, addr: usize) -> u8 {
        self.set_address(addr);
        self.write(EECR, EERE);
        self.eedr
    }

    fn write_byte(&mut self, addr: usize, value: u8) {
        self.set_address(addr);
        self.write(EEDR, value);
        self.write(EECR, EEMPE);
        self.write(EECR, EEMPE | EEPE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic::{read_value, write_value};

    #[test]
    fn test_register_read_back() {
        let mut ctrl = EepromCtrl::new(Chip::Atmega32u4);
        assert!(ctrl.write(EEARL, 0x34));
        assert!(ctrl.write(EEARH, 0x12));
        // 1 KB part: 10 address bits
        assert_eq!(ctrl.eear, 0x0234);
        assert_eq!(ctrl.read(EEARH), Some(0x02));
        assert_eq!(ctrl.read(0x49), None);
        assert!(!ctrl.write(0x49, 0));
    }

    #[test]
    fn test_write_sequence() {
        let mut ctrl = EepromCtrl::new(Chip::Atmega328p);
        ctrl.write(EEARL, 0x10);
        ctrl.write(EEDR, 0x5A);
        ctrl.write(EECR, EEMPE);
        ctrl.write(EECR, EEMPE | EEPE);
        assert_eq!(ctrl.eeprom().as_bytes()[0x10], 0x5A);
        assert_eq!(ctrl.commits, 1);
        assert_eq!(ctrl.eecr & (EEPE | EEMPE), 0);
    }

    #[test]
    fn test_eepe_without_master_ignored() {
        let mut ctrl = EepromCtrl::new(Chip::Atmega32u4);
        ctrl.write(EEDR, 0x00);
        ctrl.write(EECR, EEPE);
        assert_eq!(ctrl.eeprom().as_bytes()[0], 0xFF);
        assert_eq!(ctrl.commits, 0);
    }

    #[test]
    fn test_program_modes() {
        let mut ctrl = EepromCtrl::new(Chip::Atmega32u4);
        ctrl.write_byte(0, 0b1111_0000);

        // Write only: bits can only be cleared
        ctrl.write(EEDR, 0b1010_1010);
        ctrl.write(EECR, EEMPE | (0b10 << EEPM_SHIFT));
        ctrl.write(EECR, EEMPE | EEPE | (0b10 << EEPM_SHIFT));
        assert_eq!(ctrl.eeprom().as_bytes()[0], 0b1010_0000);
        assert_eq!(ctrl.mode(), 0b10);

        // Erase only
        ctrl.write(EECR, EEMPE | (0b01 << EEPM_SHIFT));
        ctrl.write(EECR, EEMPE | EEPE | (0b01 << EEPM_SHIFT));
        assert_eq!(ctrl.eeprom().as_bytes()[0], 0xFF);
    }

    #[test]
    fn test_read_strobe() {
        let mut mem = Eeprom::new(1024);
        mem.load(&[0, 0, 0x77]);
        let mut ctrl = EepromCtrl::with_memory(mem);
        ctrl.write(EEARL, 2);
        ctrl.write(EECR, EERE);
        assert_eq!(ctrl.read(EEDR), Some(0x77));
        assert_eq!(ctrl.read(EECR), Some(0));
    }

    #[test]
    fn test_address_wraps_on_power_of_two_part() {
        let mut ctrl = EepromCtrl::new(Chip::Attiny85);
        ctrl.write_byte(512 + 3, 0x01);
        assert_eq!(ctrl.eeprom().as_bytes()[3], 0x01);
    }

    #[test]
    fn test_generic_values_through_registers() {
        let mut ctrl = EepromCtrl::new(Chip::Atmega2560);
        assert_eq!(write_value(&mut ctrl, 4000, &-123_456i32), 4);
        let mut out = 0i32;
        assert_eq!(read_value(&mut ctrl, 4000, &mut out), 4);
        assert_eq!(out, -123_456);
        assert_eq!(ctrl.commits, 4);
        assert_eq!(ctrl.into_eeprom().total_writes(), 4);
    }
}
