//! Error types for the voterpix-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the voterpix library.
#[derive(Error, Debug)]
pub enum VoterpixError {
    /// Invalid input set; nothing was processed.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// A document could not be processed.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Fatal input validation errors, raised before any work begins.
#[derive(Error, Debug)]
pub enum InputError {
    /// No input files were given.
    #[error("no input files provided")]
    NoInputs,

    /// The path could not be resolved to an absolute path.
    #[error("invalid file path: {path} ({source})")]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The path does not exist.
    #[error("input file does not exist: {0}")]
    NotFound(PathBuf),

    /// The path is a directory.
    #[error("input path is a directory, not a file: {0}")]
    IsDirectory(PathBuf),
}

/// Errors that abort one document. Sibling documents are unaffected.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Failed to open or parse the PDF file.
    #[error("failed to open document: {0}")]
    Open(String),

    /// The document has no pages.
    #[error("document has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// Text of a page could not be extracted.
    #[error("could not extract text from page {page}: {reason}")]
    PageText { page: u32, reason: String },

    /// Images of a page could not be located.
    #[error("could not extract images from page {page}: {reason}")]
    PageImages { page: u32, reason: String },

    /// The per-document output directory could not be created.
    #[error("could not create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors for a single image. These are logged and the image is skipped.
#[derive(Error, Debug)]
pub enum PageImageError {
    /// The image stream uses an encoding that is not decoded.
    #[error("unsupported image encoding: {0}")]
    Unsupported(String),

    /// The image stream could not be decoded to a raster.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The raster could not be encoded.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    /// The encoded file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read or written.
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the config schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value is out of its accepted range.
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Result type for the voterpix library.
pub type Result<T> = std::result::Result<T, VoterpixError>;
