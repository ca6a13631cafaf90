use std::path::{Path, PathBuf};

use super::normalize::{normalize, normalize_opt};

/// Find the first file in `directory` whose extension matches `extension`
/// (case-insensitive, leading dot optional) and whose NFC-normalized stem
/// contains the NFC-normalized `fragment`.
///
/// Returns `None` when the directory is missing or unreadable, or when no
/// entry matches. When several files match, the first one in directory
/// iteration order wins; that order is filesystem-defined.
pub fn find_file(directory: &Path, fragment: &str, extension: &str) -> Option<PathBuf> {
    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("cannot list {}: {e}", directory.display());
            return None;
        }
    };

    let target = normalize(fragment);
    let wanted_ext = extension.trim_start_matches('.');

    for entry in entries {
        let Ok(entry) = entry else {
            continue;
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let ext_matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(wanted_ext));
        if !ext_matches {
            continue;
        }

        let Some(stem) = normalize_opt(path.file_stem().and_then(|s| s.to_str())) else {
            continue;
        };
        if stem.contains(&target) {
            log::debug!("{fragment:?} matched {}", path.display());
            return Some(path);
        }
    }

    log::debug!("no .{wanted_ext} file matching {fragment:?} in {}", directory.display());
    None
}
