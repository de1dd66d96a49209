//! Supplementary Volume Descriptor (Joliet support)
//!
//! The Supplementary VD enables Joliet extensions for long Unicode filenames.
//! It has the same layout as the primary descriptor; the escape sequences
//! at offset 88 say whether its strings are UCS-2.

/// Joliet escape sequences: UCS-2 Level 1, 2 and 3
pub const JOLIET_ESCAPES: [&[u8; 3]; 3] = [b"%/@", b"%/C", b"%/E"];

/// Check if a supplementary descriptor's escape sequences select Joliet
pub fn is_joliet(escape_sequences: &[u8; 32]) -> bool {
    JOLIET_ESCAPES
        .iter()
        .any(|esc| escape_sequences.starts_with(&esc[..]))
}
