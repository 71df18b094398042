//! Byte decoding helpers.

use std::borrow::Cow;

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from `<meta charset="...">`)
/// 3. Falls back to Windows-1252 (common in legacy pages)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the charset label from a `<meta charset=...>` or
/// `<meta http-equiv content="...; charset=...">` near the start of a document.
///
/// Only the first 1024 bytes are inspected, matching the HTML prescan window.
pub fn sniff_meta_charset(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(1024);
    let prefix = &bytes[..check_len];

    let pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))?;
    let mut rest = &prefix[pos + 8..];

    if let Some((&quote, tail)) = rest.split_first()
        && (quote == b'"' || quote == b'\'')
    {
        rest = tail;
    }

    let end = rest
        .iter()
        .position(|&b| matches!(b, b'"' | b'\'' | b';' | b'>' | b'/') || b.is_ascii_whitespace())
        .unwrap_or(rest.len());

    if end == 0 {
        return None;
    }
    std::str::from_utf8(&rest[..end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_utf8_borrows() {
        let decoded = decode_text("héllo".as_bytes(), None);
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(decoded, "héllo");
    }

    #[test]
    fn test_decode_falls_back_to_windows_1252() {
        // 0xE9 is 'é' in Windows-1252 and invalid as a lone UTF-8 byte
        let decoded = decode_text(b"caf\xE9", None);
        assert_eq!(decoded, "café");
    }

    #[test]
    fn test_decode_uses_hint() {
        // 0xE9 in ISO-8859-7 is 'ι'
        let decoded = decode_text(b"\xE9", Some("iso-8859-7"));
        assert_eq!(decoded, "ι");
    }

    #[test]
    fn test_sniff_meta_charset() {
        assert_eq!(
            sniff_meta_charset(br#"<html><head><meta charset="latin1"></head>"#),
            Some("latin1")
        );
        assert_eq!(
            sniff_meta_charset(
                br#"<meta http-equiv="Content-Type" content="text/html; charset=windows-1251">"#
            ),
            Some("windows-1251")
        );
        assert_eq!(sniff_meta_charset(b"<p>no charset here</p>"), None);
    }
}
