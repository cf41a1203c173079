//! String helpers shared by the extractors and by table consumers.

use std::cmp::Ordering;

use encoding_rs::WINDOWS_1252;

use crate::cursor::is_white;

/// Decodes single-byte table text into a `String`.
///
/// Every byte maps to exactly one `char`, so nothing is lost.
pub fn decode(bytes: &[u8]) -> String {
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Case-insensitive substring search. Returns the byte index of the first
/// match.
pub fn stristr(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Strips whitespace (space, tab, newline, carriage return) from both ends.
pub fn trim_white(bytes: &[u8]) -> &[u8] {
    trim_trailing_white(trim_leading_white(bytes))
}

pub fn trim_leading_white(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|&b| !is_white(b) && b != b'\r')
        .unwrap_or(bytes.len());
    &bytes[start..]
}

pub fn trim_trailing_white(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| !is_white(b) && b != b'\r')
        .map_or(0, |i| i + 1);
    &bytes[..end]
}

pub fn drop_trailing_white_space(text: &mut String) {
    let len = text.trim_end_matches([' ', '\t', '\n', '\r']).len();
    text.truncate(len);
}

pub fn drop_leading_white_space(text: &mut String) {
    let skip = text.len() - text.trim_start_matches([' ', '\t', '\n', '\r']).len();
    text.drain(..skip);
}

pub fn drop_white_space(text: &mut String) {
    drop_trailing_white_space(text);
    drop_leading_white_space(text);
}

/// Removes carriage returns from a multi-paragraph block.
pub fn compact_multitext_string(text: &mut String) {
    text.retain(|c| c != '\r');
}

/// Cuts `text` at its first `#`, then drops trailing whitespace.
///
/// Returns whether a `#` was found.
pub fn end_string_at_first_hash_symbol(text: &mut String) -> bool {
    match text.find('#') {
        Some(index) => {
            text.truncate(index);
            drop_trailing_white_space(text);
            true
        }
        None => false,
    }
}

/// Replaces the first occurrence of `from`. Returns its byte index.
pub fn replace_one(text: &mut String, from: &str, to: &str) -> Option<usize> {
    if from.is_empty() {
        return None;
    }
    let index = text.find(from)?;
    text.replace_range(index..index + from.len(), to);
    Some(index)
}

/// Replaces every occurrence of `from`. Returns how many were replaced.
pub fn replace_all(text: &mut String, from: &str, to: &str) -> usize {
    if from.is_empty() {
        return 0;
    }
    let count = text.matches(from).count();
    if count > 0 {
        *text = text.replace(from, to);
    }
    count
}

/// Compares subsystem names case-insensitively, ignoring one trailing `s`
/// on either side ("engine" matches "Engines").
pub fn subsystem_compare(a: &str, b: &str) -> Ordering {
    fn stem(name: &str) -> &[u8] {
        let bytes = name.as_bytes();
        match bytes.last() {
            Some(b's' | b'S') => &bytes[..bytes.len() - 1],
            _ => bytes,
        }
    }

    let (a, b) = (stem(a), stem(b));
    a.len().cmp(&b.len()).then_with(|| {
        a.iter()
            .map(u8::to_ascii_lowercase)
            .cmp(b.iter().map(u8::to_ascii_lowercase))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stristr() {
        assert_eq!(stristr(b"text $END_MULTI_TEXT", b"$end_multi_text"), Some(5));
        assert_eq!(stristr(b"abc", b"abcd"), None);
        assert_eq!(stristr(b"abc", b""), Some(0));
    }

    #[test]
    fn test_trim_white() {
        assert_eq!(trim_white(b" \t a b \r\n"), b"a b");
        assert_eq!(trim_white(b"   "), b"");
    }

    #[test]
    fn test_decode_high_bytes() {
        assert_eq!(decode(b"abc"), "abc");
        assert_eq!(decode(&[0xE9]).chars().count(), 1);
    }

    #[test]
    fn test_drop_white_space() {
        let mut text = String::from("  name \t\n");
        drop_white_space(&mut text);
        assert_eq!(text, "name");
    }

    #[test]
    fn test_end_string_at_first_hash_symbol() {
        let mut name = String::from("GTF Ulysses #alpha");
        assert!(end_string_at_first_hash_symbol(&mut name));
        assert_eq!(name, "GTF Ulysses");
        assert!(!end_string_at_first_hash_symbol(&mut name));
    }

    #[test]
    fn test_replace() {
        let mut text = String::from("a-b-c");
        assert_eq!(replace_one(&mut text, "-", "+"), Some(1));
        assert_eq!(text, "a+b-c");
        assert_eq!(replace_all(&mut text, "-", "::"), 1);
        assert_eq!(text, "a+b::c");
        assert_eq!(replace_one(&mut text, "zz", "y"), None);
    }

    #[test]
    fn test_subsystem_compare() {
        assert_eq!(subsystem_compare("engine", "Engines"), Ordering::Equal);
        assert_eq!(subsystem_compare("Weapons", "weapon"), Ordering::Equal);
        assert_ne!(subsystem_compare("sensors", "navigation"), Ordering::Equal);
    }

    #[test]
    fn test_compact_multitext_string() {
        let mut text = String::from("line\r\nnext");
        compact_multitext_string(&mut text);
        assert_eq!(text, "line\nnext");
    }
}
