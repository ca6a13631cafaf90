//! Unicode canonical composition for file and sheet names.
//!
//! Filesystems (notably macOS) may hand back Hangul names in decomposed
//! jamo form (NFD) while the configured names are composed (NFC). Every
//! substring test in the crate runs on NFC text on both sides.

use unicode_normalization::{is_nfc_quick, IsNormalized, UnicodeNormalization};

/// Return `text` in Unicode composed form (NFC). Empty input comes back empty.
pub fn normalize(text: &str) -> String {
    if text.is_empty() || is_nfc_quick(text.chars()) == IsNormalized::Yes {
        return text.to_string();
    }
    text.nfc().collect()
}

/// Like [`normalize`] but passes an absent value through unchanged.
pub fn normalize_opt(text: Option<&str>) -> Option<String> {
    text.map(normalize)
}
