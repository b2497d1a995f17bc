//! Error types for scene and renderer configuration.
//!
//! Only configuration can fail. Once a `FrameDriver` exists, every frame
//! produces a defined image.

use thiserror::Error;

use super::parser::ParserError;

#[derive(Error, Debug)]
pub enum Error {
    /// The camera vectors do not span a basis (zero-length view direction,
    /// or `up` parallel to it)
    #[error("degenerate camera: {0}")]
    DegenerateCamera(String),

    /// Sphere with a non-positive radius or a non-finite field
    #[error("sphere {index}: {reason}")]
    InvalidSphere { index: usize, reason: String },

    /// Out-of-range tracer or buffer setting
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("scene file: {0}")]
    Parse(#[from] ParserError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image output: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
