//! Request processing error taxonomy
//!
//! Client input problems map to 400, everything else caught at the
//! handler boundary maps to 500. Classification failures never appear
//! here: they are contained inside the pipeline and surface only as a
//! visual marker plus fallback values.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    /// The request body carried no `image` field.
    #[error("No image data received")]
    MissingInput,

    /// The payload was not a decodable data-URL image (missing
    /// `base64,` marker, bad base64, or codec failure).
    #[error("Invalid image data")]
    InvalidImage,

    /// Anything unexpected during processing. Converted to a 500
    /// response, never allowed to crash the process.
    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl ProcessError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, ProcessError::MissingInput | ProcessError::InvalidImage)
    }
}
