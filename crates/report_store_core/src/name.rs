//! Report name validation.
//!
//! Report names take part in storage key and file path lookups, so only
//! bare single-component identifiers are accepted. Names Windows would
//! silently alias (trailing dots, device names such as `CON` or `lpt1.txt`)
//! are rejected on every platform so a catalog directory stays portable.

use std::ffi::OsStr;
use std::path::Path;

const FORBIDDEN_CHARS: &[char] = &['/', '\\', ':'];

const RESERVED_DEVICE_NAMES: &[&str] = &["CON", "PRN", "AUX", "NUL"];
const NUMBERED_DEVICE_PREFIXES: &[&str] = &["COM", "LPT"];

/// Returns whether `name` is a bare report identifier.
///
/// A valid name is non-empty, has no surrounding whitespace, contains no
/// path separators, drive/stream separators or control characters, and is
/// its own last path component (which rules out `.` and `..`). It also
/// does not end in `.` and is not a Windows device name, with or without
/// an extension.
pub fn is_valid_report_name(name: &str) -> bool {
    if name.is_empty() || name.trim() != name || name.ends_with('.') {
        return false;
    }
    if name.contains(FORBIDDEN_CHARS) || name.chars().any(char::is_control) {
        return false;
    }
    if is_reserved_device_name(name) {
        return false;
    }
    Path::new(name).file_name() == Some(OsStr::new(name))
}

fn is_reserved_device_name(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name).trim_end();
    if RESERVED_DEVICE_NAMES
        .iter()
        .any(|reserved| stem.eq_ignore_ascii_case(reserved))
    {
        return true;
    }
    NUMBERED_DEVICE_PREFIXES.iter().any(|prefix| {
        stem.len() == prefix.len() + 1
            && stem.is_char_boundary(prefix.len())
            && stem[..prefix.len()].eq_ignore_ascii_case(prefix)
            && matches!(stem.as_bytes()[prefix.len()], b'1'..=b'9')
    })
}
