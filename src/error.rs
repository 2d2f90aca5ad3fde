use thiserror::Error;

/// Library error type for poster dithering operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No compatible rendering backend could be created.
    #[error("renderer unavailable: {0}")]
    RendererUnavailable(String),

    /// An operation that needs a backend ran before `init`.
    #[error("render session has not been initialized")]
    NotInitialized,

    /// The session was disposed; no further calls are valid.
    #[error("render session has been disposed")]
    Disposed,

    /// The supplied bytes are not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The image decoded but carries no pixels.
    #[error("image {0} has no pixels")]
    EmptyImage(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A blocking decode worker panicked or was cancelled.
    #[error("decode worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    /// Rendering/resource error from the backend.
    #[error("render error: {0}")]
    Render(anyhow::Error),
}

impl Error {
    /// Whether this error means the caller handed us an unusable image.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::EmptyImage(_))
    }
}
