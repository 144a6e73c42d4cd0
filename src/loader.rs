//! Turning selected files into the ordered image collection.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};
use log::{debug, warn};

use crate::error::{Error, Result};

/// One user-selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    /// Display name, usually the file name.
    pub name: String,
    /// Declared MIME type, e.g. `image/png`.
    pub mime: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl FileBlob {
    /// Create a blob from its parts.
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Whether the declared MIME type is an image type.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// A file that was skipped because it failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// Name of the file.
    pub name: String,
    /// Decoder message.
    pub reason: String,
}

/// Result of a completed load.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Decoded images, in submission order.
    pub images: Vec<RgbaImage>,
    /// Non-fatal per-file decode failures.
    pub warnings: Vec<LoadWarning>,
    /// Number of blobs skipped for not being images.
    pub skipped: usize,
}

/// Shared flag used to abandon an in-flight load.
///
/// Clones observe the same flag, so a handle can be passed to another thread
/// and cancelled from there.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Decode a single blob into an RGBA raster.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the bytes are not a decodable image.
pub fn decode(blob: &FileBlob) -> Result<RgbaImage> {
    image::load_from_memory(&blob.bytes)
        .map(|img| img.to_rgba8())
        .map_err(|source| Error::Decode {
            name: blob.name.clone(),
            source,
        })
}

/// Decode `blobs` one at a time, in order.
///
/// Non-image blobs are skipped silently. Decode failures are collected as
/// warnings and the file is left out. `on_progress(position, total)` fires
/// after each image is added, where `position` is the 1-based index of the
/// blob in `blobs`.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] if `cancel` is triggered before the load
/// completes. Nothing decoded so far is returned in that case.
pub fn load_images<F>(
    blobs: &[FileBlob],
    cancel: &CancelToken,
    mut on_progress: F,
) -> Result<LoadOutcome>
where
    F: FnMut(usize, usize),
{
    let total = blobs.len();
    let mut outcome = LoadOutcome::default();

    for (index, blob) in blobs.iter().enumerate() {
        if cancel.is_cancelled() {
            debug!("load cancelled after {index}/{total} files");
            return Err(Error::Cancelled);
        }

        if !blob.is_image() {
            debug!("skipping {} ({})", blob.name, blob.mime);
            outcome.skipped += 1;
            continue;
        }

        match decode(blob) {
            Ok(img) => {
                debug!("decoded {} ({}x{})", blob.name, img.width(), img.height());
                outcome.images.push(img);
                on_progress(index + 1, total);
            }
            Err(e) => {
                warn!("{e}");
                let reason = match e {
                    Error::Decode { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                outcome.warnings.push(LoadWarning {
                    name: blob.name.clone(),
                    reason,
                });
            }
        }
    }

    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    Ok(outcome)
}

/// MIME type for a path, judged by its extension.
#[must_use]
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let format = ImageFormat::from_path(path).ok()?;
    match format {
        ImageFormat::Png
        | ImageFormat::Jpeg
        | ImageFormat::WebP
        | ImageFormat::Bmp
        | ImageFormat::Gif => Some(format.to_mime_type()),
        _ => None,
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    mime_for_path(path).is_some()
}
