//! In-memory EEPROM model.
//!
//! Cells start in the erased state (0xFF), as on a factory-fresh AVR part.
//! Out-of-range accesses never panic:
//!
//! | Access            | In range        | At or beyond capacity |
//! |-------------------|-----------------|-----------------------|
//! | `read_byte`       | stored byte     | 0xFF                  |
//! | `write_byte`      | stored, counted | dropped               |
//!
//! Each cell carries a write counter so callers can observe wear, and the
//! whole image carries a dirty flag that tracks unsaved changes.

use crate::{Chip, EepromStorage};

/// Erased cell value.
pub const ERASED: u8 = 0xFF;

/// Byte-addressable EEPROM backed by a `Vec<u8>`.
#[derive(Debug, Clone)]
pub struct Eeprom {
    cells: Vec<u8>,
    /// Writes per cell since creation. `load` leaves it alone; `load_wear` restores it
    wear: Vec<u32>,
    /// True if modified since last load / `mark_clean`
    dirty: bool,
}

impl Eeprom {
    pub fn new(size: usize) -> Self {
        Eeprom {
            cells: vec![ERASED; size],
            wear: vec![0; size],
            dirty: false,
        }
    }

    pub fn for_chip(chip: Chip) -> Self {
        Self::new(chip.eeprom_size())
    }

    /// Raw cell contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Write count for one cell (0 for out-of-range addresses).
    pub fn wear(&self, addr: usize) -> u32 {
        self.wear.get(addr).copied().unwrap_or(0)
    }

    /// Per-cell write counts.
    pub fn wear_map(&self) -> &[u32] {
        &self.wear
    }

    /// Total byte writes across all cells.
    pub fn total_writes(&self) -> u64 {
        self.wear.iter().map(|&w| w as u64).sum()
    }

    /// Highest per-cell write count.
    pub fn max_wear(&self) -> u32 {
        self.wear.iter().copied().max().unwrap_or(0)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Return every cell to 0xFF. Counts as one write per cell.
    pub fn erase(&mut self) {
        for (cell, w) in self.cells.iter_mut().zip(self.wear.iter_mut()) {
            *cell = ERASED;
            *w = w.saturating_add(1);
        }
        self.dirty = true;
    }

    /// Save EEPROM contents to a byte vector.
    pub fn save(&self) -> Vec<u8> {
        self.cells.clone()
    }

    /// Load EEPROM contents from a byte slice.
    ///
    /// Copies `min(data.len(), capacity)` bytes; cells past the end of `data`
    /// keep their current contents. Returns the number of bytes copied.
    pub fn load(&mut self, data: &[u8]) -> usize {
        let len = data.len().min(self.cells.len());
        if data.len() > self.cells.len() {
            log::warn!(
                "EEPROM image is {} bytes, truncating to capacity {}",
                data.len(),
                self.cells.len()
            );
        }
        self.cells[..len].copy_from_slice(&data[..len]);
        self.dirty = false;
        len
    }

    /// Restore per-cell write counts (snapshot load).
    pub fn load_wear(&mut self, wear: &[u32]) {
        let len = wear.len().min(self.wear.len());
        self.wear[..len].copy_from_slice(&wear[..len]);
    }
}

impl EepromStorage for Eeprom {
    #[inline]
    fn capacity(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    fn read_byte(&mut self, addr: usize) -> u8 {
        self.cells.get(addr).copied().unwrap_or(ERASED)
    }

    #[inline]
    fn write_byte(&mut self, addr: usize, value: u8) {
        if addr < self.cells.len() {
            self.cells[addr] = value;
            self.wear[addr] = self.wear[addr].saturating_add(1);
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_erased() {
        let mem = Eeprom::for_chip(Chip::Atmega32u4);
        assert_eq!(mem.capacity(), 1024);
        assert!(mem.as_bytes().iter().all(|&b| b == 0xFF));
        assert!(!mem.is_dirty());
    }

    #[test]
    fn test_write_marks_dirty_and_counts() {
        let mut mem = Eeprom::new(16);
        mem.write_byte(3, 0x42);
        mem.write_byte(3, 0x43);
        assert!(mem.is_dirty());
        assert_eq!(mem.read_byte(3), 0x43);
        assert_eq!(mem.wear(3), 2);
        assert_eq!(mem.total_writes(), 2);
        assert_eq!(mem.max_wear(), 2);
        mem.mark_clean();
        assert!(!mem.is_dirty());
    }

    #[test]
    fn test_out_of_range() {
        let mut mem = Eeprom::new(4);
        mem.write_byte(4, 0x00);
        mem.write_byte(usize::MAX, 0x00);
        assert_eq!(mem.read_byte(4), 0xFF);
        assert!(!mem.is_dirty());
        assert_eq!(mem.total_writes(), 0);
        assert_eq!(mem.wear(100), 0);
    }

    #[test]
    fn test_load_truncates_and_clears_dirty() {
        let mut mem = Eeprom::new(4);
        mem.write_byte(0, 0);
        assert_eq!(mem.load(&[1, 2, 3, 4, 5, 6]), 4);
        assert_eq!(mem.as_bytes(), &[1, 2, 3, 4]);
        assert!(!mem.is_dirty());

        assert_eq!(mem.load(&[9]), 1);
        assert_eq!(mem.save(), vec![9, 2, 3, 4]);
    }

    #[test]
    fn test_load_keeps_wear() {
        let mut mem = Eeprom::new(4);
        mem.write_byte(1, 0x10);
        mem.load(&[0, 0, 0, 0]);
        assert_eq!(mem.wear(1), 1);
        mem.load_wear(&[5, 6]);
        assert_eq!(mem.wear(1), 6);
        assert_eq!(mem.total_writes(), 11);
    }

    #[test]
    fn test_erase() {
        let mut mem = Eeprom::new(4);
        mem.load(&[0, 0, 0, 0]);
        mem.erase();
        assert_eq!(mem.as_bytes(), &[0xFF; 4]);
        assert_eq!(mem.total_writes(), 4);
        assert!(mem.is_dirty());
    }
}
