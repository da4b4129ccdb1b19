use crate::update::draft::DraftError;
use crate::update::validate::ValidationErrorSet;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no api token available; set PROGRESSCTL_API_TOKEN")]
    MissingToken,
    #[error("request failed: {0}")]
    Request(String),
    /// Server-side rejection; carries the server's message verbatim.
    #[error("{0}")]
    Server(String),
    #[error("failed to decode server response: {0}")]
    Decode(String),
    #[error("validation failed for {}: submission refused", field_list(.0))]
    ValidationFailed(ValidationErrorSet),
    #[error(transparent)]
    Draft(#[from] DraftError),
}

fn field_list(errors: &ValidationErrorSet) -> String {
    errors
        .iter()
        .map(|(field, _)| field.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
