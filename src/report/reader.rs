//! Encoding-safe decoding of the raw report bytes.
//!
//! `powercfg` nominally writes UTF-8, but on some host locales the report
//! comes out as UTF-16. A UTF-8 decode of UTF-16 text is full of NUL code
//! units, so the fallback is detected by scanning the first decode attempt
//! rather than by guessing from the file.

/// Decode report bytes, falling back to UTF-16 when the UTF-8 attempt shows
/// embedded NULs.
pub fn decode_report(bytes: &[u8]) -> String {
    let utf8 = String::from_utf8_lossy(bytes);
    if utf8.contains('\u{0}') {
        decode_utf16(bytes)
    } else {
        utf8.into_owned()
    }
}

fn decode_utf16(bytes: &[u8]) -> String {
    // Honor a BOM if present; powercfg writes little-endian without asking.
    let (payload, big_endian) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        _ => (bytes, false),
    };

    let units = payload.chunks_exact(2).map(|pair| {
        if big_endian {
            u16::from_be_bytes([pair[0], pair[1]])
        } else {
            u16::from_le_bytes([pair[0], pair[1]])
        }
    });

    char::decode_utf16(units)
        .map(|ch| ch.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "<h1>Battery report</h1><td>DESIGN CAPACITY</td><td>57,027 mWh</td>";

    fn utf16le_bytes(text: &str, with_bom: bool) -> Vec<u8> {
        let mut out = Vec::new();
        if with_bom {
            out.extend_from_slice(&[0xFF, 0xFE]);
        }
        for unit in text.encode_utf16() {
            out.extend_from_slice(&unit.to_le_bytes());
        }
        out
    }

    #[test]
    fn utf8_bytes_pass_through() {
        assert_eq!(decode_report(FIXTURE.as_bytes()), FIXTURE);
    }

    #[test]
    fn utf16_with_bom_is_detected_and_decoded() {
        assert_eq!(decode_report(&utf16le_bytes(FIXTURE, true)), FIXTURE);
    }

    #[test]
    fn utf16_without_bom_defaults_to_little_endian() {
        assert_eq!(decode_report(&utf16le_bytes(FIXTURE, false)), FIXTURE);
    }

    #[test]
    fn utf16_big_endian_bom_is_honored() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in FIXTURE.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_report(&bytes), FIXTURE);
    }
}
