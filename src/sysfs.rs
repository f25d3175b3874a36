//! Small-file reader for sysfs sensor attributes
//!
//! Every hwmon and thermal attribute is a tiny text file holding either a
//! label or an integer in milli-units. Reads here never fail loudly: a
//! missing, unreadable or garbled file comes back as `None` and the caller
//! picks a fallback.

use log::trace;
use std::fs;
use std::path::Path;

/// Divisor turning millidegrees (and other milli-units) into whole units
pub const MILLI: f64 = 1000.0;

/// Read file contents as string, trimming whitespace.
///
/// Returns `None` for missing files, permission errors and empty files.
pub fn read_text<P: AsRef<Path>>(path: P) -> Option<String> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(content) => {
            let trimmed = content.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(e) => {
            trace!("read {} failed: {}", path.display(), e);
            None
        }
    }
}

/// Parse the leading integer of a sysfs value.
///
/// Mirrors `strtol`: an optional sign followed by digits, trailing garbage
/// ignored. A result of zero is only accepted when the text literally starts
/// with `0`, so an empty or non-numeric read is never mistaken for 0.
pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());

    let value = if end == 0 {
        0
    } else {
        let magnitude: i64 = digits[..end].parse().ok()?;
        if negative {
            -magnitude
        } else {
            magnitude
        }
    };

    if value == 0 && !text.starts_with('0') {
        return None;
    }
    Some(value)
}

/// Read an integer attribute and scale it by `divisor`.
pub fn read_number<P: AsRef<Path>>(path: P, divisor: f64) -> Option<f64> {
    let text = read_text(path)?;
    parse_int(&text).map(|raw| raw as f64 / divisor)
}

/// Read an unscaled integer attribute (fan RPM, PWM).
pub fn read_int<P: AsRef<Path>>(path: P) -> Option<i64> {
    read_text(path).and_then(|text| parse_int(&text))
}

/// Check that `path` exists and is a directory (symlinks followed).
pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}
