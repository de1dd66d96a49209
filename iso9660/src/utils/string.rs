//! String handling utilities
//!
//! ISO9660 uses various string encodings: ASCII d-characters and
//! a-characters in the primary hierarchy, UCS-2 big-endian under Joliet.

use crate::types::NameEncoding;
use alloc::string::String;

/// Trim trailing spaces (and NUL fill) from byte slice
pub fn trim_trailing_spaces(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && (bytes[end - 1] == b' ' || bytes[end - 1] == 0) {
        end -= 1;
    }
    &bytes[..end]
}

/// Convert ISO9660 d-characters to string
///
/// d-characters: A-Z, 0-9, _
pub fn dchars_to_str(bytes: &[u8]) -> Result<&str, core::str::Utf8Error> {
    let trimmed = trim_trailing_spaces(bytes);
    core::str::from_utf8(trimmed)
}

/// Convert ISO9660 a-characters to string
///
/// a-characters: A-Z, 0-9, space, !, ", %, &, ', (, ), *, +, ,, -, ., /, :, ;, <, =, >, ?
pub fn achars_to_str(bytes: &[u8]) -> Result<&str, core::str::Utf8Error> {
    let trimmed = trim_trailing_spaces(bytes);
    core::str::from_utf8(trimmed)
}

/// Decode UCS-2 big-endian text, replacing unpaired surrogates
///
/// A trailing odd byte is ignored.
pub fn ucs2be_to_string(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Decode a descriptor text field (system/volume identifiers and friends)
pub fn decode_text_field(bytes: &[u8], encoding: NameEncoding) -> String {
    match encoding {
        NameEncoding::Iso9660 => match achars_to_str(bytes) {
            Ok(s) => String::from(s),
            Err(_) => String::from_utf8_lossy(trim_trailing_spaces(bytes)).into_owned(),
        },
        NameEncoding::Joliet => {
            let decoded = ucs2be_to_string(bytes);
            String::from(decoded.trim_end_matches([' ', '\0']))
        }
    }
}

/// Decode a file identifier into its display name
///
/// The version suffix is stripped; see [`strip_version`].
pub fn decode_identifier(bytes: &[u8], encoding: NameEncoding) -> String {
    let raw = match encoding {
        NameEncoding::Iso9660 => match dchars_to_str(bytes) {
            Ok(s) => String::from(s),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        NameEncoding::Joliet => ucs2be_to_string(bytes),
    };
    String::from(strip_version(&raw))
}

/// Strip version suffix from filename (e.g., "FILE.TXT;1" -> "FILE.TXT")
/// Also removes trailing dot if present (e.g., "FILE.;1" -> "FILE")
pub fn strip_version(name: &str) -> &str {
    let base = name.split(';').next().unwrap_or(name);
    if let Some(stripped) = base.strip_suffix('.') {
        stripped
    } else {
        base
    }
}
