use thiserror::Error;

/// Errors surfaced by the editing core.
///
/// Missing preconditions (no image loaded, no selection, nothing selected)
/// are not errors; those operations quietly do nothing.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The bytes handed to the editor could not be decoded as an image
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The composited output could not be encoded
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// A file that is not an image was offered to an image input
    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("Invalid font data for family '{family}'")]
    InvalidFont { family: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for editor operations
pub type EditorResult<T> = Result<T, EditorError>;
