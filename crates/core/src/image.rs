//! EEPROM image files.
//!
//! Three on-disk formats are supported, chosen by file extension:
//!
//! | Extension              | Format                                   |
//! |------------------------|------------------------------------------|
//! | `.eep` `.hex` `.ihx`   | Intel HEX (what avr-gcc emits for EEPROM) |
//! | `.eeps`                | Compressed snapshot (contents + wear)    |
//! | anything else          | Raw binary, one byte per cell            |
//!
//! ## Snapshot file format
//!
//! ```text
//! +------------------+
//! | Magic "EEPS"     |  4 bytes
//! +------------------+
//! | Format version   |  u32 little-endian (currently 1)
//! +------------------+
//! | Chip id          |  u8 (see Chip::id)
//! +------------------+
//! | Compressed data  |  deflate-compressed bincode payload
//! +------------------+
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{hex, Chip, Eeprom, EepromStorage, Error, Result};

/// Magic bytes identifying an EEPROM snapshot file.
const MAGIC: &[u8; 4] = b"EEPS";
/// Current snapshot format version.
const FORMAT_VERSION: u32 = 1;
/// Header length: magic + version + chip id.
const HEADER_LEN: usize = 9;

/// On-disk image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Raw,
    #[serde(alias = "hex", alias = "eep")]
    IntelHex,
    Snapshot,
}

impl ImageFormat {
    /// Pick the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("eep") | Some("hex") | Some("ihx") => ImageFormat::IntelHex,
            Some("eeps") => ImageFormat::Snapshot,
            _ => ImageFormat::Raw,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SnapshotPayload {
    chip: Chip,
    data: Vec<u8>,
    wear: Vec<u32>,
}

/// Encode an EEPROM as a snapshot (header + deflate-compressed payload).
pub fn encode_snapshot(eeprom: &Eeprom, chip: Chip) -> Result<Vec<u8>> {
    let payload = SnapshotPayload {
        chip,
        data: eeprom.save(),
        wear: eeprom.wear_map().to_vec(),
    };
    let raw = bincode::serialize(&payload)?;
    let compressed = miniz_oxide::deflate::compress_to_vec(&raw, 6);

    let mut out = Vec::with_capacity(HEADER_LEN + compressed.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.push(chip.id());
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Decode a snapshot, verifying magic, version, and chip.
pub fn decode_snapshot(data: &[u8], expected: Chip) -> Result<Eeprom> {
    if data.len() < HEADER_LEN || &data[0..4] != MAGIC {
        return Err(Error::BadMagic);
    }
    let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if version != FORMAT_VERSION {
        return Err(Error::UnsupportedVersion { found: version, expected: FORMAT_VERSION });
    }
    let chip_id = data[8];
    if chip_id != expected.id() {
        let file = Chip::from_id(chip_id).map_or_else(|| format!("id {}", chip_id), |c| c.to_string());
        return Err(Error::ChipMismatch { file, current: expected.to_string() });
    }

    let raw = miniz_oxide::inflate::decompress_to_vec(&data[HEADER_LEN..])
        .map_err(|e| Error::Decompress(format!("{:?}", e)))?;
    let payload: SnapshotPayload = bincode::deserialize(&raw)?;
    if payload.chip != expected {
        return Err(Error::ChipMismatch { file: payload.chip.to_string(), current: expected.to_string() });
    }

    let mut eeprom = Eeprom::for_chip(expected);
    eeprom.load(&payload.data);
    eeprom.load_wear(&payload.wear);
    Ok(eeprom)
}

/// Decode image bytes of the given format into a fresh EEPROM for `chip`.
pub fn decode(data: &[u8], format: ImageFormat, chip: Chip) -> Result<Eeprom> {
    match format {
        ImageFormat::Snapshot => decode_snapshot(data, chip),
        ImageFormat::IntelHex => {
            let text = String::from_utf8_lossy(data);
            let mut cells = vec![crate::memory::ERASED; chip.eeprom_size()];
            let len = hex::parse_hex(&text, &mut cells)?;
            log::debug!("Intel HEX image: {} bytes used", len);
            let mut eeprom = Eeprom::for_chip(chip);
            eeprom.load(&cells);
            Ok(eeprom)
        }
        ImageFormat::Raw => {
            let mut eeprom = Eeprom::for_chip(chip);
            eeprom.load(data);
            Ok(eeprom)
        }
    }
}

/// Encode an EEPROM into image bytes of the given format.
pub fn encode(eeprom: &Eeprom, format: ImageFormat, chip: Chip) -> Result<Vec<u8>> {
    match format {
        ImageFormat::Snapshot => encode_snapshot(eeprom, chip),
        ImageFormat::IntelHex => Ok(hex::to_hex(eeprom.as_bytes()).into_bytes()),
        ImageFormat::Raw => Ok(eeprom.save()),
    }
}

/// Load an image file, format chosen from its extension.
pub fn load_image(path: &Path, chip: Chip) -> Result<Eeprom> {
    let data = fs::read(path)?;
    let format = ImageFormat::from_path(path);
    log::debug!("Loading {:?} image {} ({} bytes)", format, path.display(), data.len());
    decode(&data, format, chip)
}

/// Save an image file, format chosen from its extension.
pub fn save_image(eeprom: &Eeprom, path: &Path, chip: Chip) -> Result<()> {
    let format = ImageFormat::from_path(path);
    let out = encode(eeprom, format, chip)?;
    log::debug!("Saving {:?} image {} ({} bytes, capacity {})",
        format, path.display(), out.len(), eeprom.capacity());
    fs::write(path, &out)?;
    Ok(())
}
