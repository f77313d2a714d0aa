//! Hexdump presentation for memory reads and raw replies.

/// Format one row of up to 16 bytes: hex in 4-byte groups, then the
/// printable ASCII column.
fn format_line(offset: usize, row: &[u8]) -> String {
    let mut out = format!("{offset:04x}:");

    for i in 0..16 {
        if i % 4 == 0 {
            out.push(' ');
        }
        match row.get(i) {
            Some(byte) => out.push_str(&format!("{byte:02X} ")),
            None => out.push_str("   "),
        }
    }

    for &byte in row {
        out.push(if (0x20..0x7f).contains(&byte) {
            byte as char
        } else {
            '.'
        });
    }
    out
}

/// Print a buffer as 16-byte hexdump rows.
pub fn hexdump(data: &[u8]) {
    for (i, row) in data.chunks(16).enumerate() {
        println!("{}", format_line(i * 16, row));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_row() {
        let row: Vec<u8> = (0x41..0x51).collect();
        assert_eq!(
            format_line(0x20, &row),
            "0020: 41 42 43 44  45 46 47 48  49 4A 4B 4C  4D 4E 4F 50 ABCDEFGHIJKLMNOP"
        );
    }

    #[test]
    fn test_partial_row_pads_hex_columns() {
        let line = format_line(0, &[0x00, 0xff]);
        assert!(line.starts_with("0000: 00 FF "));
        assert!(line.ends_with(".."));
    }
}
