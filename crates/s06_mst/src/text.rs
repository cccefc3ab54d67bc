//! Text encoding helpers for the legacy codepages and UTF-16 bodies.
//!
//! Message names and placeholders are stored as Shift-JIS (codepage 932)
//! on disk; message bodies are UTF-16 in the file's endianness. Everything
//! in-memory is UTF-8 or host-order UTF-16.

use std::borrow::Cow;

use encoding_rs::{mem, Encoding, SHIFT_JIS, WINDOWS_1252};
use widestring::{U16Str, U16String};

/// Codepage id for Japanese Shift-JIS.
pub const CP_SJIS: u16 = 932;

/// Codepage id for Windows Latin.
pub const CP_1252: u16 = 1252;

fn encoding_for(cp: u16) -> Option<&'static Encoding> {
    match cp {
        CP_SJIS => Some(SHIFT_JIS),
        CP_1252 => Some(WINDOWS_1252),
        _ => None,
    }
}

/// Decode legacy 8-bit text to UTF-8.
///
/// Falls back from the requested codepage to Windows-1252 and then to
/// Latin-1, which cannot fail. Decoding with codepage 932 maps the wave
/// dash to the fullwidth tilde: cp932 stores Shift-JIS 0x8160 as U+FF5E,
/// while chart-faithful decoders emit U+301C.
pub fn decode_cpn(cp: u16, bytes: &[u8]) -> String {
    let decoded = encoding_for(cp)
        .and_then(|enc| enc.decode_without_bom_handling_and_without_replacement(bytes))
        .or_else(|| {
            if cp != CP_1252 {
                WINDOWS_1252.decode_without_bom_handling_and_without_replacement(bytes)
            } else {
                None
            }
        })
        .map(Cow::into_owned)
        .unwrap_or_else(|| mem::decode_latin1(bytes).into_owned());

    if cp == CP_SJIS && decoded.contains('\u{301C}') {
        return decoded.replace('\u{301C}', "\u{FF5E}");
    }
    decoded
}

/// Encode UTF-8 text into a legacy codepage.
pub fn encode_cpn(cp: u16, text: &str) -> Vec<u8> {
    let enc = encoding_for(cp).unwrap_or(WINDOWS_1252);
    enc.encode(text).0.into_owned()
}

/// Convert host-order UTF-16 text to UTF-8, replacing unpaired surrogates.
pub fn utf16_to_utf8(text: &U16Str) -> String {
    text.to_string_lossy()
}

/// Convert UTF-8 text to host-order UTF-16.
pub fn utf8_to_utf16(text: &str) -> U16String {
    U16String::from_str(text)
}

/// Swap the byte order of every UTF-16 code unit in place.
pub fn byteswap_utf16(units: &mut [u16]) {
    for unit in units {
        *unit = unit.swap_bytes();
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{byteswap_utf16, decode_cpn, encode_cpn, utf16_to_utf8, utf8_to_utf16, CP_SJIS};

    #[test]
    fn decodes_shift_jis_names() {
        // "ソニック" in Shift-JIS
        let bytes = [0x83, 0x5C, 0x83, 0x6A, 0x83, 0x62, 0x83, 0x4E];
        assert_eq!(decode_cpn(CP_SJIS, &bytes), "ソニック");
    }

    #[test]
    fn wave_dash_becomes_fullwidth_tilde() {
        // Shift-JIS 0x8160
        let bytes = [0x81, 0x60];
        assert_eq!(decode_cpn(CP_SJIS, &bytes), "\u{FF5E}");
    }

    #[test]
    fn malformed_shift_jis_falls_back() {
        // 0x80 is not a valid Shift-JIS lead byte sequence on its own;
        // the cp1252/latin1 fallback still yields something readable.
        let bytes = [0x80, 0xFF];
        let decoded = decode_cpn(CP_SJIS, &bytes);
        assert!(!decoded.is_empty());
    }

    #[test]
    fn encodes_ascii_names_verbatim() {
        assert_eq!(encode_cpn(CP_SJIS, "MSG_HELLO"), b"MSG_HELLO");
    }

    #[test]
    fn utf16_round_trip() {
        let text = utf8_to_utf16("foo\nbar");
        assert_eq!(utf16_to_utf8(&text), "foo\nbar");
    }

    #[test]
    fn byteswap_swaps_in_place() {
        let mut units = [0x0048u16, 0x3042];
        byteswap_utf16(&mut units);
        assert_eq!(units, [0x4800, 0x4230]);
    }
}
