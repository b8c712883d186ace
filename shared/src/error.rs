use thiserror::Error;

/// Failures talking to the inference service or the recipe proxy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Please enter at least one ingredient.")]
    EmptyInput,
}
