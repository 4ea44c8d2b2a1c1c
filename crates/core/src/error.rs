use std::{io, result};

use thiserror::Error;

pub type Result<T, E = Error> = result::Result<T, E>;

/// Errors from the fallible surfaces around the raw copy routines:
/// image files, Intel HEX parsing, snapshot decoding, and argument checks.
///
/// `write_value` / `read_value` never produce one of these.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),

    // Intel HEX
    #[error("Intel HEX line {line}: {reason}")]
    Hex { line: usize, reason: String },

    // Snapshot container
    #[error("Invalid EEPROM snapshot file (bad magic)")]
    BadMagic,

    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Chip mismatch: file={file} current={current}")]
    ChipMismatch { file: String, current: String },

    #[error("Decompress error: {0}")]
    Decompress(String),

    #[error("Snapshot codec error: {0}")]
    Codec(#[from] bincode::Error),

    // Argument validation
    #[error("Unknown chip: {0}")]
    UnknownChip(String),

    #[error("Range 0x{addr:04X}+{len} exceeds EEPROM capacity {capacity}")]
    OutOfRange {
        addr: usize,
        len: usize,
        capacity: usize,
    },
}
