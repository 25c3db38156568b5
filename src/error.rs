use std::path::PathBuf;

/// Everything that can go wrong in the editor. None of these are fatal: the
/// UI turns them into a toast and leaves the current state untouched.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("not a valid image: {0}")]
    InvalidInput(String),

    #[error("no image loaded")]
    NoImageLoaded,

    #[error("clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    #[error("failed to write {path}: {source}")]
    Export {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("image encode failed: {0}")]
    Encode(image::ImageError),
}
