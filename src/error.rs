//! Error types for the background-knockout crate.

/// Errors that can occur while loading, compositing or exporting images.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A selected file claimed to be an image but could not be decoded.
    #[error("failed to decode {name}: {source}")]
    Decode {
        /// Name of the offending file.
        name: String,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// No drawing surface was available when one was required.
    #[error("no rendering surface available")]
    MissingSurface,

    /// A load was cancelled before it finished.
    #[error("image loading was cancelled")]
    Cancelled,

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A background variant name was not recognised.
    #[error("unknown background variant '{0}'")]
    UnknownVariant(String),

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred during image encoding.
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
