pub mod api;
pub mod error;
pub mod multipart;

pub use api::{
    EnvTokenProvider, FilesUploaded, ProgressApiClient, SubmitMetadata, SubmitOutcome,
    TokenProvider, TOKEN_ENV_VAR,
};
pub use error::ApiError;
pub use multipart::{
    combined_progress_parts, encode_multipart, MultipartBody, PayloadPart,
    SUPPORTING_FILES_FIELD,
};
