//! Width resolution policy for corpus inputs.
//!
//! Some corpus files encode the row width of their pixel buffer in the
//! file name: a generated input is named after its width alone
//! (`512.bin`), and inputs produced from source images carry a width
//! prefix (`512-lena.raw`). A file-encoded width always overrides the
//! caller-supplied default.

use std::path::Path;

/// Resolves the row width for `input`, preferring a width encoded in the
/// file name over `default_width`.
#[must_use]
pub fn resolve_width(input: &Path, default_width: u32) -> u32 {
    file_encoded_width(input).unwrap_or(default_width)
}

/// Extracts a width from the input's file stem, if the stem follows one
/// of the recognized dimension naming conventions:
///
/// - the whole stem is a positive integer (`512.bin` → 512);
/// - the stem starts with `<integer>-` (`512-lena.raw` → 512).
#[must_use]
pub fn file_encoded_width(input: &Path) -> Option<u32> {
    let stem = input.file_stem()?.to_str()?;
    let head = stem.split_once('-').map_or(stem, |(head, _)| head);
    head.parse::<u32>().ok().filter(|width| *width > 0)
}
