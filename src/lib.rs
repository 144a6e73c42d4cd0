//! Knock out solid black or white backgrounds and stack the results.
//!
//! Every image is scanned pixel by pixel. Pixels whose red, green and blue
//! channels are all below 30 (black variant) or all above 225 (white variant)
//! get their alpha set to zero. The cleared images are then drawn, in the
//! order they were selected, onto one canvas the size of the first image, and
//! that canvas can be exported as a PNG.
//!
//! # Quick Start
//!
//! ```no_run
//! use background_knockout::{composite, encode_png, BackgroundVariant};
//!
//! let logo = image::open("logo-on-black.png").unwrap().to_rgba8();
//! let text = image::open("text-on-black.png").unwrap().to_rgba8();
//! let canvas = composite(&[logo, text], &BackgroundVariant::Black).unwrap();
//! std::fs::write("processed-image.png", encode_png(&canvas).unwrap()).unwrap();
//! ```
//!
//! # Sessions
//!
//! [`Session`] wraps the same pipeline in the select / process / export
//! actions of an interactive tool. The host plugs in through
//! [`Environment`]; [`FsEnvironment`] is the filesystem-backed one used by the
//! `bg-knockout` binary.
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use background_knockout::{FsEnvironment, LogReporter, ProcessOptions, Session};
//!
//! let mut env = FsEnvironment::with_output_dir(vec![PathBuf::from("scans")], Path::new("."));
//! let mut session = Session::new(ProcessOptions::default());
//! session.select_files(&mut env, &mut LogReporter).unwrap();
//! session.process(&mut env, &mut LogReporter).unwrap();
//! session.export(&mut env).unwrap();
//! ```

#![deny(missing_docs)]

pub mod blending;
pub mod classify;
pub mod compositor;
pub mod environment;
pub mod error;
pub mod export;
pub mod loader;
mod session;
pub mod surface;

pub use classify::{BackgroundVariant, PixelPredicate};
pub use compositor::{composite, composite_with_progress};
pub use environment::{Environment, FsEnvironment, LogReporter, StatusReporter};
pub use error::{Error, Result};
pub use export::{encode_png, EXPORT_FILE_NAME};
pub use loader::{load_images, CancelToken, FileBlob, LoadOutcome, LoadWarning};
pub use session::{ProcessOptions, Session};
pub use surface::{RasterSurface, Surface};
