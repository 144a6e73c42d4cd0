//! Host capabilities the session depends on.
//!
//! The session never touches files, windows or download targets directly.
//! Everything it needs from the outside world comes through [`Environment`],
//! and human-readable progress goes out through [`StatusReporter`].

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::Result;
use crate::export::EXPORT_FILE_NAME;
use crate::loader::{self, FileBlob};
use crate::surface::{RasterSurface, Surface};

/// MIME type given to files whose extension is not a known image type.
const UNKNOWN_MIME: &str = "application/octet-stream";

/// Capabilities supplied by the host.
pub trait Environment {
    /// Ask the user for files. Order is the selection order.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection itself cannot be made, such as an
    /// unreadable input directory.
    fn request_files(&mut self) -> Result<Vec<FileBlob>>;

    /// The surface processed output is shown on, if one exists.
    fn render_surface(&mut self) -> Option<&mut dyn Surface>;

    /// Hand `bytes` to the user as a file called `filename`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be delivered.
    fn trigger_download(&mut self, bytes: &[u8], filename: &str) -> Result<()>;

    /// Leave the current page.
    fn navigate_home(&mut self);
}

/// Receives informational status lines.
pub trait StatusReporter {
    /// Show `message` to the user.
    fn status(&mut self, message: &str);
}

impl<F> StatusReporter for F
where
    F: FnMut(&str),
{
    fn status(&mut self, message: &str) {
        self(message);
    }
}

/// Forwards status lines to the `log` facade at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl StatusReporter for LogReporter {
    fn status(&mut self, message: &str) {
        info!("{message}");
    }
}

/// Filesystem-backed environment.
///
/// Inputs are paths: files are taken as given, directories contribute their
/// supported images sorted by file name. Files that cannot be read are
/// logged and left out of the selection. The download target is a single
/// output path.
#[derive(Debug)]
pub struct FsEnvironment {
    inputs: Vec<PathBuf>,
    output: PathBuf,
    surface: Option<RasterSurface>,
}

impl FsEnvironment {
    /// Environment reading `inputs` and writing downloads to `output`.
    #[must_use]
    pub fn new(inputs: Vec<PathBuf>, output: PathBuf) -> Self {
        Self {
            inputs,
            output,
            surface: Some(RasterSurface::default()),
        }
    }

    /// Environment whose downloads land in `dir/processed-image.png`.
    #[must_use]
    pub fn with_output_dir(inputs: Vec<PathBuf>, dir: &Path) -> Self {
        Self::new(inputs, dir.join(EXPORT_FILE_NAME))
    }

    /// Drop the rendering surface, making render-dependent actions fail.
    #[must_use]
    pub fn without_surface(mut self) -> Self {
        self.surface = None;
        self
    }

    /// Where downloads are written.
    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// The current surface contents, if a surface exists.
    #[must_use]
    pub fn surface(&self) -> Option<&RasterSurface> {
        self.surface.as_ref()
    }

    fn expand_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for input in &self.inputs {
            if input.is_dir() {
                let mut entries: Vec<PathBuf> = fs::read_dir(input)?
                    .filter_map(|entry| match entry {
                        Ok(e) => Some(e),
                        Err(e) => {
                            warn!("skipping unreadable entry in {}: {e}", input.display());
                            None
                        }
                    })
                    .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                    .map(|e| e.path())
                    .filter(|p| loader::is_supported_image(p))
                    .collect();
                entries.sort();
                debug!("{}: {} images", input.display(), entries.len());
                paths.extend(entries);
            } else {
                paths.push(input.clone());
            }
        }
        Ok(paths)
    }
}

impl Environment for FsEnvironment {
    fn request_files(&mut self) -> Result<Vec<FileBlob>> {
        let blobs = self
            .expand_inputs()?
            .into_iter()
            .filter_map(|path| {
                let bytes = match fs::read(&path) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!("skipping {}: {e}", path.display());
                        return None;
                    }
                };
                let name = path.file_name().map_or_else(
                    || path.display().to_string(),
                    |f| f.to_string_lossy().to_string(),
                );
                let mime = loader::mime_for_path(&path).unwrap_or(UNKNOWN_MIME);
                Some(FileBlob::new(name, mime, bytes))
            })
            .collect();
        Ok(blobs)
    }

    fn render_surface(&mut self) -> Option<&mut dyn Surface> {
        self.surface.as_mut().map(|s| s as &mut dyn Surface)
    }

    fn trigger_download(&mut self, bytes: &[u8], filename: &str) -> Result<()> {
        if let Some(parent) = self.output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.output, bytes)?;
        info!("saved {filename} to {}", self.output.display());
        Ok(())
    }

    fn navigate_home(&mut self) {
        debug!("navigate home requested; nothing to do outside a browser");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_files_expands_directories_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        let img = image::RgbaImage::new(1, 1);
        img.save(dir.path().join("b.png")).unwrap();
        img.save(dir.path().join("a.png")).unwrap();
        fs::write(dir.path().join("readme.txt"), "hi").unwrap();

        let mut env = FsEnvironment::with_output_dir(vec![dir.path().to_path_buf()], dir.path());
        let blobs = env.request_files().unwrap();
        let names: Vec<_> = blobs.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert!(blobs.iter().all(FileBlob::is_image));
    }

    #[test]
    fn explicit_non_image_files_are_passed_through_as_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hi").unwrap();

        let mut env = FsEnvironment::with_output_dir(vec![path], dir.path());
        let blobs = env.request_files().unwrap();
        assert_eq!(blobs.len(), 1);
        assert!(!blobs[0].is_image());
    }

    #[test]
    fn unreadable_input_is_skipped_without_failing_the_selection() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("ok.png");
        image::RgbaImage::new(1, 1).save(&good).unwrap();

        let mut env = FsEnvironment::with_output_dir(
            vec![dir.path().join("nope.png"), good],
            dir.path(),
        );
        let blobs = env.request_files().unwrap();
        let names: Vec<_> = blobs.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["ok.png"]);
    }

    #[test]
    fn download_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/deeper/result.png");
        let mut env = FsEnvironment::new(Vec::new(), out.clone());
        env.trigger_download(b"data", EXPORT_FILE_NAME).unwrap();
        assert_eq!(fs::read(out).unwrap(), b"data");
    }

    #[test]
    fn surface_can_be_removed() {
        let mut env = FsEnvironment::new(Vec::new(), PathBuf::from("x.png")).without_surface();
        assert!(env.render_surface().is_none());
        assert!(env.surface().is_none());
    }

    #[test]
    fn closures_report_status() {
        let mut lines = Vec::new();
        {
            let mut reporter = |m: &str| lines.push(m.to_string());
            reporter.status("one");
            reporter.status("two");
        }
        assert_eq!(lines, vec!["one", "two"]);
    }
}
