//! Intel HEX reader and writer for EEPROM images.
//!
//! avr-gcc emits a sketch's initialized EEPROM section as an `.eep` file in
//! Intel HEX format (`:LLAAAATT[DD...]CC`). Record types 00 (data), 01 (EOF),
//! 02 (extended segment address) and 04 (extended linear address) are
//! honored; 03 and 05 (start address) are accepted and ignored.

use crate::{Error, Result};

/// Data bytes per record emitted by [`to_hex`].
const RECORD_LEN: usize = 16;

/// Parse Intel HEX text into `buf`.
///
/// Bytes addressed beyond `buf.len()` are skipped. Returns the highest
/// address reached (one past the last byte loaded).
pub fn parse_hex(hex: &str, buf: &mut [u8]) -> Result<usize> {
    let mut max_addr = 0usize;
    let mut base_addr: u32 = 0;

    for (n, line) in hex.lines().enumerate() {
        let line_no = n + 1;
        let line = line.trim();
        if line.is_empty() { continue; }
        let Some(body) = line.strip_prefix(':') else {
            continue; // skip non-hex lines
        };

        let bytes = hex_line_to_bytes(body).map_err(|reason| Error::Hex { line: line_no, reason })?;
        if bytes.len() < 5 {
            return Err(Error::Hex { line: line_no, reason: "line too short".into() });
        }

        let byte_count = bytes[0] as usize;
        if bytes.len() != byte_count + 5 {
            return Err(Error::Hex {
                line: line_no,
                reason: format!("length {} does not match byte count {}", bytes.len() - 5, byte_count),
            });
        }
        let addr = ((bytes[1] as u16) << 8) | bytes[2] as u16;
        let record_type = bytes[3];

        let sum: u8 = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        if sum != 0 {
            return Err(Error::Hex { line: line_no, reason: format!("checksum error: sum={}", sum) });
        }

        match record_type {
            0x00 => {
                let full_addr = base_addr as usize + addr as usize;
                for i in 0..byte_count {
                    let target = full_addr + i;
                    if target < buf.len() {
                        buf[target] = bytes[4 + i];
                        max_addr = max_addr.max(target + 1);
                    }
                }
            }
            0x01 => break,
            0x02 => {
                if byte_count >= 2 {
                    base_addr = (((bytes[4] as u32) << 8) | bytes[5] as u32) << 4;
                }
            }
            0x04 => {
                if byte_count >= 2 {
                    base_addr = (((bytes[4] as u32) << 8) | bytes[5] as u32) << 16;
                }
            }
            0x03 | 0x05 => {}
            other => {
                log::debug!("Intel HEX line {}: skipping record type 0x{:02X}", line_no, other);
            }
        }
    }

    Ok(max_addr)
}

/// Format `data` as Intel HEX, 16 data bytes per record, terminated by an
/// EOF record. Extended linear address records are emitted when the image
/// crosses a 64 KiB boundary.
pub fn to_hex(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 3 + 16);
    let mut upper: u32 = 0;
    for (i, chunk) in data.chunks(RECORD_LEN).enumerate() {
        let addr = (i * RECORD_LEN) as u32;
        if addr >> 16 != upper {
            upper = addr >> 16;
            push_record(&mut s, 0, 0x04, &(upper as u16).to_be_bytes());
        }
        push_record(&mut s, addr as u16, 0x00, chunk);
    }
    push_record(&mut s, 0, 0x01, &[]);
    s
}

fn push_record(s: &mut String, addr: u16, record_type: u8, data: &[u8]) {
    let mut sum = (data.len() as u8)
        .wrapping_add((addr >> 8) as u8)
        .wrapping_add(addr as u8)
        .wrapping_add(record_type);
    s.push_str(&format!(":{:02X}{:04X}{:02X}", data.len(), addr, record_type));
    for &b in data {
        s.push_str(&format!("{:02X}", b));
        sum = sum.wrapping_add(b);
    }
    s.push_str(&format!("{:02X}\n", sum.wrapping_neg()));
}

/// Convert hex character pairs to bytes
fn hex_line_to_bytes(hex_str: &str) -> std::result::Result<Vec<u8>, String> {
    let chars: Vec<char> = hex_str.chars().collect();
    if chars.len() % 2 != 0 {
        return Err("odd number of hex characters".into());
    }

    let mut bytes = Vec::with_capacity(chars.len() / 2);
    for chunk in chars.chunks(2) {
        let hi = hex_char(chunk[0])?;
        let lo = hex_char(chunk[1])?;
        bytes.push((hi << 4) | lo);
    }
    Ok(bytes)
}

fn hex_char(c: char) -> std::result::Result<u8, String> {
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or_else(|| format!("invalid hex character: {}", c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_hex() {
        let hex = ":100000000C9434000C944E000C944E000C944E0052\n:00000001FF\n";
        let mut buf = vec![0xFFu8; 1024];
        let size = parse_hex(hex, &mut buf).unwrap();
        assert_eq!(size, 16);
        assert_eq!(&buf[..6], &[0x0C, 0x94, 0x34, 0x00, 0x0C, 0x94]);
        assert_eq!(buf[16], 0xFF);
    }

    #[test]
    fn test_parse_avr_gcc_eep() {
        // `EEMEM uint32_t boots = 1234;` placed at 0x0010
        let mut buf = vec![0xFFu8; 32];
        let hex = ":04001000D204000016\n:00000001FF\n";
        assert_eq!(parse_hex(hex, &mut buf).unwrap(), 0x14);
        assert_eq!(&buf[0x10..0x14], &[0xD2, 0x04, 0x00, 0x00]);
        assert!(buf[..0x10].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_checksum_error() {
        let hex = ":100000000C9434000C944E000C944E000C944E00FF\n:00000001FF\n";
        let mut buf = vec![0u8; 1024];
        match parse_hex(hex, &mut buf) {
            Err(Error::Hex { line: 1, reason }) => assert!(reason.contains("checksum")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_character_reports_line() {
        let hex = ":00000001FF\n:0100000ZFF\n";
        let mut buf = vec![0u8; 4];
        // EOF on line 1 stops before the bad line
        assert_eq!(parse_hex(hex, &mut buf).unwrap(), 0);
        let hex = "\n:0100000ZFF\n";
        assert!(matches!(parse_hex(hex, &mut buf), Err(Error::Hex { line: 2, .. })));
    }

    #[test]
    fn test_empty_hex() {
        let mut buf = vec![0u8; 1024];
        assert_eq!(parse_hex(":00000001FF\n", &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_to_hex_format() {
        let hex = to_hex(&[0xD2, 0x04, 0x00, 0x00]);
        assert_eq!(hex, ":04000000D204000026\n:00000001FF\n");
    }

    #[test]
    fn test_to_hex_parses_back() {
        let data: Vec<u8> = (0..100u8).collect();
        let hex = to_hex(&data);
        assert_eq!(hex.lines().count(), 8); // 7 data records + EOF
        let mut buf = vec![0xFFu8; 1024];
        assert_eq!(parse_hex(&hex, &mut buf).unwrap(), 100);
        assert_eq!(&buf[..100], &data[..]);
    }

    #[test]
    fn test_extended_linear_address() {
        let data = vec![0xA5u8; 0x1_0010];
        let hex = to_hex(&data);
        assert!(hex.contains(":020000040001F9\n"));
        let mut buf = vec![0u8; 0x1_0010];
        assert_eq!(parse_hex(&hex, &mut buf).unwrap(), 0x1_0010);
        assert!(buf.iter().all(|&b| b == 0xA5));
    }
}
