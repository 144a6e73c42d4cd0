//! PNG export of the output canvas.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::error::Result;

/// File name offered for the exported canvas.
pub const EXPORT_FILE_NAME: &str = "processed-image.png";

/// Encode an RGBA canvas as PNG bytes.
///
/// # Errors
///
/// Returns [`crate::Error::Image`] if the encoder fails.
pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Default export location inside `dir`.
///
/// Example: `"out"` becomes `"out/processed-image.png"`.
#[must_use]
pub fn default_output_path(dir: &Path) -> PathBuf {
    dir.join(EXPORT_FILE_NAME)
}

/// Where an export should be written given an optional `-o` style target.
///
/// `None` means the working directory. Existing directories, paths ending in
/// a separator and paths without an extension are treated as directories and
/// get [`EXPORT_FILE_NAME`] appended; anything else is used as the file path.
#[must_use]
pub fn resolve_output_path(target: Option<&Path>) -> PathBuf {
    let Some(target) = target else {
        return PathBuf::from(EXPORT_FILE_NAME);
    };
    let trailing_separator = target
        .as_os_str()
        .to_string_lossy()
        .ends_with(std::path::is_separator);
    if target.is_dir() || trailing_separator || target.extension().is_none() {
        default_output_path(target)
    } else {
        target.to_path_buf()
    }
}
