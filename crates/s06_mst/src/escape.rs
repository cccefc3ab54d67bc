//! Reversible escaping of control characters for XML embedding.
//!
//! Message text may contain newlines and form feeds that XML serializers
//! and translation editors mangle; those and the backslash itself travel
//! as two-character sequences instead.

/// Escape backslashes, newlines and form feeds.
///
/// A result consisting of nothing but spaces gets its first character
/// rewritten to `\x20`, because whitespace-only XML text nodes do not
/// survive serialization.
pub fn escape(text: &str) -> String {
    let mut ret = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' => ret.push_str("\\\\"),
            '\n' => ret.push_str("\\n"),
            '\x0C' => ret.push_str("\\f"),
            _ => ret.push(c),
        }
    }

    if !ret.is_empty() && ret.bytes().all(|b| b == b' ') {
        ret.replace_range(0..1, "\\x20");
    }

    ret
}

/// Undo [`escape`], also accepting `\xHH` hex escapes.
///
/// An unrecognized escape sequence passes the backslash and the following
/// character through unchanged; a lone backslash at the end of the string
/// stays literal.
pub fn unescape(text: &str) -> String {
    let mut ret = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            ret.push(c);
            continue;
        }

        match chars.next() {
            None => {
                ret.push('\\');
                break;
            }
            Some('\\') => ret.push('\\'),
            Some('n') => ret.push('\n'),
            Some('f') => ret.push('\x0C'),
            Some('x') => {
                let rest = chars.as_str();
                let hex = rest.as_bytes();
                if hex.len() >= 2 && hex[0].is_ascii_hexdigit() && hex[1].is_ascii_hexdigit() {
                    // Two ASCII digits, so the slice is on char boundaries.
                    let value = u8::from_str_radix(&rest[..2], 16).unwrap();
                    ret.push(value as char);
                    chars = rest[2..].chars();
                } else {
                    ret.push('\\');
                    ret.push('x');
                }
            }
            Some(other) => {
                ret.push('\\');
                ret.push(other);
            }
        }
    }

    ret
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::{escape, unescape};

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape("foo\nbar"), "foo\\nbar");
        assert_eq!(escape("a\\b"), "a\\\\b");
        assert_eq!(escape("page\x0Cbreak"), "page\\fbreak");
        assert_eq!(escape(""), "");
    }

    #[test]
    fn whitespace_only_text_gets_hex_escaped() {
        assert_eq!(escape(" "), "\\x20");
        assert_eq!(escape("   "), "\\x20  ");
        // mixed content keeps its spaces as-is
        assert_eq!(escape(" a "), " a ");
    }

    #[test]
    fn unescapes_hex_sequences() {
        assert_eq!(unescape("\\x20"), " ");
        assert_eq!(unescape("\\x20  "), "   ");
        assert_eq!(unescape("\\x41"), "A");
    }

    #[test]
    fn unknown_escapes_pass_through() {
        assert_eq!(unescape("\\q"), "\\q");
        assert_eq!(unescape("\\xZZ"), "\\xZZ");
        assert_eq!(unescape("\\x4"), "\\x4");
        assert_eq!(unescape("tail\\"), "tail\\");
    }

    #[test]
    fn round_trips_concrete_strings() {
        for s in [
            "plain",
            "foo\nbar",
            "a\\b\\\\c",
            "\x0C",
            " ",
            "      ",
            "\\x20",
            "日本語\nテキスト",
            "ends with backslash\\",
        ] {
            assert_eq!(unescape(&escape(s)), s, "round trip of {s:?}");
        }
    }

    proptest! {
        /// `unescape(escape(s)) == s` over strings salted with the
        /// characters the codec cares about.
        #[test]
        fn prop_escape_round_trips(
            s in prop::collection::vec(
                prop_oneof![
                    Just('\\'), Just('\n'), Just('\x0C'), Just(' '),
                    Just('x'), Just('2'), Just('0'), any::<char>()
                ],
                0..64
            )
        ) {
            let s: String = s.into_iter().collect();
            prop_assert_eq!(unescape(&escape(&s)), s);
        }
    }
}
