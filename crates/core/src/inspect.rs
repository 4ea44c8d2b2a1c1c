//! EEPROM image inspection.
//!
//! - **Dump**: Hex + ASCII view of any address range
//! - **Diff**: Only the bytes that differ between two images
//! - **Used ranges**: Runs of cells that are not in the erased state

use std::ops::Range;

use crate::memory::ERASED;

/// Format a hex + ASCII dump of an EEPROM image, 16 cells per row.
///
/// Consecutive rows that are entirely erased collapse into one
/// `start..end  erased (N bytes)` line.
pub fn dump(data: &[u8], start: usize, length: usize) -> String {
    let end = start.saturating_add(length).min(data.len());
    let mut out = String::new();
    let mut blank_from = None;
    for row in (start..end).step_by(16) {
        let cells = &data[row..(row + 16).min(end)];
        if cells.iter().all(|&b| b == ERASED) {
            blank_from.get_or_insert(row);
            continue;
        }
        push_blank(&mut out, blank_from.take(), row);
        push_row(&mut out, row, cells);
    }
    push_blank(&mut out, blank_from, end);
    out
}

fn push_blank(out: &mut String, from: Option<usize>, to: usize) {
    if let Some(from) = from {
        out.push_str(&format!("{:04X}..{:04X}  erased ({} bytes)\n", from, to - 1, to - from));
    }
}

fn push_row(out: &mut String, addr: usize, cells: &[u8]) {
    out.push_str(&format!("{:04X}: ", addr));
    for col in 0..16 {
        match cells.get(col) {
            Some(b) => out.push_str(&format!("{:02X} ", b)),
            None => out.push_str("   "),
        }
        if col == 7 { out.push(' '); }
    }
    out.push(' ');
    out.extend(cells.iter().map(|&c| if c.is_ascii_graphic() || c == b' ' { c as char } else { '.' }));
    out.push('\n');
}

/// Format a diff view showing only changed bytes between two images.
///
/// Cells present in only one image are reported against 0xFF.
pub fn diff(old: &[u8], new: &[u8], start: usize, length: usize) -> String {
    let mut s = String::new();
    let end = start.saturating_add(length).min(old.len().max(new.len()));
    let mut any = false;
    for i in start..end {
        let a = old.get(i).copied().unwrap_or(ERASED);
        let b = new.get(i).copied().unwrap_or(ERASED);
        if a != b {
            s.push_str(&format!("  0x{:04X}: {:02X} → {:02X}\n", i, a, b));
            any = true;
        }
    }
    if !any { s.push_str("  (no changes)\n"); }
    s
}

/// Address ranges holding non-erased bytes, in ascending order.
pub fn used_ranges(data: &[u8]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut run_start: Option<usize> = None;
    for (i, &b) in data.iter().enumerate() {
        match (b != ERASED, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(st)) => {
                ranges.push(st..i);
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(st) = run_start {
        ranges.push(st..data.len());
    }
    ranges
}

/// One-line summary of used ranges, e.g. `0x0000-0x0003, 0x000A-0x000B (6 bytes)`.
pub fn summarize_used(data: &[u8]) -> String {
    let ranges = used_ranges(data);
    if ranges.is_empty() {
        return "(blank)".into();
    }
    let total: usize = ranges.iter().map(|r| r.len()).sum();
    let parts: Vec<String> = ranges
        .iter()
        .map(|r| format!("0x{:04X}-0x{:04X}", r.start, r.end - 1))
        .collect();
    format!("{} ({} bytes)", parts.join(", "), total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump() {
        let mut data = vec![0xFFu8; 64];
        data[0x10] = 0x41; // 'A'
        data[0x11] = 0x42; // 'B'
        let out = dump(&data, 0x10, 16);
        assert!(out.starts_with("0010:"));
        assert!(out.contains("41 42"));
        assert!(out.contains("AB.............."));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_dump_clamps_to_image() {
        let data = vec![0u8; 20];
        let out = dump(&data, 16, 1000);
        assert_eq!(out.lines().count(), 1);
        assert!(dump(&data, 40, 16).is_empty());
    }

    #[test]
    fn test_dump_collapses_erased_rows() {
        let mut data = vec![0xFFu8; 80];
        data[0x20] = 0x00;
        let out = dump(&data, 0, data.len());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "0000..001F  erased (32 bytes)");
        assert!(lines[1].starts_with("0020: 00 FF"));
        assert_eq!(lines[2], "0030..004F  erased (32 bytes)");
        assert_eq!(dump(&[0xFF; 4], 0, 4), "0000..0003  erased (4 bytes)\n");
    }

    #[test]
    fn test_diff() {
        let old = vec![0xFFu8; 8];
        let mut new = old.clone();
        new[3] = 0x12;
        let out = diff(&old, &new, 0, 8);
        assert_eq!(out, "  0x0003: FF → 12\n");
        assert_eq!(diff(&old, &old, 0, 8), "  (no changes)\n");
    }

    #[test]
    fn test_diff_uneven_lengths() {
        let out = diff(&[0xFF, 0x00], &[0xFF], 0, usize::MAX);
        assert_eq!(out, "  0x0001: 00 → FF\n");
    }

    #[test]
    fn test_used_ranges() {
        let mut data = vec![0xFFu8; 16];
        data[0..4].copy_from_slice(&[0xD2, 0x04, 0x00, 0x00]);
        data[10] = 1;
        data[11] = 2;
        data[15] = 0;
        assert_eq!(used_ranges(&data), vec![0..4, 10..12, 15..16]);
        assert_eq!(summarize_used(&data), "0x0000-0x0003, 0x000A-0x000B, 0x000F-0x000F (7 bytes)");
        assert_eq!(summarize_used(&[0xFF; 4]), "(blank)");
    }
}
