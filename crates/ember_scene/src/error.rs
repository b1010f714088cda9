use ember_render::TextureError;
use thiserror::Error;

/// Errors that can occur while loading a scene description.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse scene file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("Invalid {field} for {object}: {reason}")]
    InvalidValue {
        object: &'static str,
        field: &'static str,
        reason: String,
    },
}

impl SceneError {
    pub(crate) fn invalid(object: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            object,
            field,
            reason: reason.into(),
        }
    }
}
