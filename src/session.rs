//! Session state and the user-facing actions: select, process, export.

use image::RgbaImage;
use log::{debug, info};

use crate::classify::BackgroundVariant;
use crate::compositor;
use crate::environment::{Environment, StatusReporter};
use crate::error::{Error, Result};
use crate::export::{self, EXPORT_FILE_NAME};
use crate::loader::{self, CancelToken};

/// Options controlling a processing session.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Which background colour to remove.
    pub variant: BackgroundVariant,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// One page's worth of state: the loaded images plus what has been shown.
///
/// Every action is local. A failed action leaves the image collection and the
/// rendered output exactly as they were before it started.
#[derive(Debug)]
pub struct Session {
    options: ProcessOptions,
    images: Vec<RgbaImage>,
    processing: bool,
    status: String,
    has_output: bool,
    cancel: CancelToken,
}

impl Session {
    /// Create an empty session.
    #[must_use]
    pub fn new(options: ProcessOptions) -> Self {
        Self {
            options,
            images: Vec::new(),
            processing: false,
            status: String::new(),
            has_output: false,
            cancel: CancelToken::new(),
        }
    }

    /// The session's options.
    #[must_use]
    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// The background variant this session removes.
    #[must_use]
    pub fn variant(&self) -> BackgroundVariant {
        self.options.variant
    }

    /// The loaded image collection, in selection order.
    #[must_use]
    pub fn images(&self) -> &[RgbaImage] {
        &self.images
    }

    /// Whether an action is currently running.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// The most recent status line.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Whether a processed result has been rendered.
    #[must_use]
    pub fn has_output(&self) -> bool {
        self.has_output
    }

    /// Whether processing and export are currently meaningful.
    #[must_use]
    pub fn can_process(&self) -> bool {
        !self.processing && !self.images.is_empty()
    }

    /// Token observed by the next (or current) load.
    ///
    /// Cancelling it abandons that load; the collection stays as it was.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Ask the environment for files and replace the image collection.
    ///
    /// Returns the number of images loaded. Decode failures are reported as
    /// status lines and do not fail the action.
    ///
    /// # Errors
    ///
    /// Returns an error if the files cannot be read or the load is cancelled.
    /// The previous collection is kept in both cases.
    pub fn select_files<E, R>(&mut self, env: &mut E, reporter: &mut R) -> Result<usize>
    where
        E: Environment + ?Sized,
        R: StatusReporter + ?Sized,
    {
        self.processing = true;
        self.report(reporter, "Loading images...".to_string());

        let token = std::mem::take(&mut self.cancel);
        let result = env.request_files().and_then(|blobs| {
            loader::load_images(&blobs, &token, |done, total| {
                let message = format!("Loaded {done}/{total} images");
                Self::report_to(&mut self.status, &mut *reporter, message);
            })
        });
        self.processing = false;

        match result {
            Ok(outcome) => {
                for w in &outcome.warnings {
                    let message = format!("Could not decode {}: {}", w.name, w.reason);
                    self.report(reporter, message);
                }
                let count = outcome.images.len();
                self.images = outcome.images;
                info!(
                    "{} session: {count} images loaded, {} skipped, {} failed",
                    self.options.variant,
                    outcome.skipped,
                    outcome.warnings.len()
                );
                self.report(reporter, format!("Loading complete, {count} images"));
                Ok(count)
            }
            Err(e) => {
                let message = match e {
                    Error::Cancelled => "Loading cancelled".to_string(),
                    ref other => format!("Loading failed: {other}"),
                };
                self.report(reporter, message);
                Err(e)
            }
        }
    }

    /// Knock out the background of every loaded image and render the stack.
    ///
    /// Returns `Ok(false)` without touching anything when no images are
    /// loaded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSurface`] if the environment has nowhere to
    /// render. Session state is unchanged in that case.
    pub fn process<E, R>(&mut self, env: &mut E, reporter: &mut R) -> Result<bool>
    where
        E: Environment + ?Sized,
        R: StatusReporter + ?Sized,
    {
        if self.images.is_empty() {
            debug!("process requested with no images loaded");
            return Ok(false);
        }
        let surface = env.render_surface().ok_or(Error::MissingSurface)?;

        self.processing = true;
        self.report(reporter, "Processing images...".to_string());

        let variant = self.options.variant;
        let status = &mut self.status;
        let canvas = compositor::composite_with_progress(&self.images, &variant, |done, total| {
            let message = format!("Processing image {done}/{total}");
            Self::report_to(&mut *status, &mut *reporter, message);
        });

        if let Some(canvas) = canvas {
            surface.write_pixels(&canvas);
            self.has_output = true;
        }

        self.processing = false;
        self.report(reporter, "Processing complete".to_string());
        Ok(true)
    }

    /// Encode the rendered surface as PNG and hand it to the environment.
    ///
    /// Returns `Ok(false)` when no images are loaded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSurface`] if there is no surface to read,
    /// or the encoder or download error otherwise.
    pub fn export<E>(&mut self, env: &mut E) -> Result<bool>
    where
        E: Environment + ?Sized,
    {
        if self.images.is_empty() {
            debug!("export requested with no images loaded");
            return Ok(false);
        }
        let pixels = env
            .render_surface()
            .ok_or(Error::MissingSurface)?
            .read_pixels();

        let bytes = export::encode_png(&pixels)?;
        env.trigger_download(&bytes, EXPORT_FILE_NAME)?;
        Ok(true)
    }

    /// Leave this session's page.
    pub fn go_home<E>(&mut self, env: &mut E)
    where
        E: Environment + ?Sized,
    {
        env.navigate_home();
    }

    fn report<R>(&mut self, reporter: &mut R, message: String)
    where
        R: StatusReporter + ?Sized,
    {
        Self::report_to(&mut self.status, reporter, message);
    }

    fn report_to<R>(status: &mut String, reporter: &mut R, message: String)
    where
        R: StatusReporter + ?Sized,
    {
        reporter.status(&message);
        *status = message;
    }
}
