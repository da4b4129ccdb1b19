use crate::client::error::ApiError;
use crate::client::multipart::{combined_progress_parts, encode_multipart};
use crate::project::{ProjectId, ProjectProgressState};
use crate::update::draft::DraftSession;
use crate::update::validate::UploadLimits;
use serde::Deserialize;

pub const TOKEN_ENV_VAR: &str = "PROGRESSCTL_API_TOKEN";

/// Supplies the bearer token for API calls. Injected so the pipeline never
/// owns token storage itself.
pub trait TokenProvider {
    fn bearer_token(&self) -> Option<String>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String>,
{
    fn bearer_token(&self) -> Option<String> {
        (self)()
    }
}

/// Reads the token from `PROGRESSCTL_API_TOKEN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvTokenProvider;

impl TokenProvider for EnvTokenProvider {
    fn bearer_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    #[serde(default)]
    message: String,
    // A bare `default` would put a `T: Default` bound on the derived impl.
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default)]
    metadata: Option<SubmitMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProjectData {
    project: ProjectProgressState,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CombinedProgressData {
    project: ProjectProgressState,
    #[serde(default)]
    updates_applied: Vec<String>,
    #[serde(default)]
    files_uploaded: FilesUploaded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesUploaded {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub total_size: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMetadata {
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub updated_by: String,
    #[serde(default)]
    pub is_fully_complete: bool,
}

/// Result of one accepted submission. `project` replaces the caller's
/// committed state wholesale.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub project: ProjectProgressState,
    pub updates_applied: Vec<String>,
    pub files_uploaded: FilesUploaded,
    pub metadata: SubmitMetadata,
    pub message: String,
}

pub struct ProgressApiClient {
    api_base: String,
    tokens: Box<dyn TokenProvider>,
}

impl ProgressApiClient {
    pub fn new(api_base: &str, tokens: Box<dyn TokenProvider>) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    fn auth_header(&self) -> Result<String, ApiError> {
        let token = self.tokens.bearer_token().ok_or(ApiError::MissingToken)?;
        Ok(format!("Bearer {token}"))
    }

    /// Fetches the committed progress state that seeds a draft session.
    pub fn fetch_project(&self, project_id: &ProjectId) -> Result<ProjectProgressState, ApiError> {
        let url = self.endpoint(&format!(
            "project/{}",
            urlencoding::encode(project_id.as_str())
        ));
        let response = ureq::get(&url)
            .set("Authorization", &self.auth_header()?)
            .call()
            .map_err(map_request_error)?;
        let envelope: ApiEnvelope<ProjectData> = response
            .into_json()
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        if !envelope.success {
            return Err(ApiError::Server(envelope.message));
        }
        envelope
            .data
            .map(|data| data.project)
            .ok_or_else(|| ApiError::Decode("response has no project payload".to_string()))
    }

    /// Validates, then issues exactly one PUT to the combined-progress
    /// endpoint. Validation failures and an in-flight draft are refused
    /// locally with no network call; the draft is left untouched on any
    /// failure so the caller can correct and retry.
    pub fn submit_combined_progress(
        &self,
        project_id: &ProjectId,
        session: &mut DraftSession,
        limits: UploadLimits,
    ) -> Result<SubmitOutcome, ApiError> {
        let errors = session.validate(limits);
        if !errors.is_empty() {
            return Err(ApiError::ValidationFailed(errors));
        }
        session.begin_submit()?;
        let result = self.put_combined(project_id, session);
        session.finish_submit();
        result
    }

    fn put_combined(
        &self,
        project_id: &ProjectId,
        session: &DraftSession,
    ) -> Result<SubmitOutcome, ApiError> {
        let parts = combined_progress_parts(&session.proposed, session.flags, session.files())?;
        let encoded = encode_multipart(&parts)?;
        let url = self.endpoint(&format!(
            "project/{}/progress/combined",
            urlencoding::encode(project_id.as_str())
        ));

        let response = ureq::put(&url)
            .set("Authorization", &self.auth_header()?)
            .set("Content-Type", &encoded.content_type)
            .send_bytes(&encoded.body)
            .map_err(map_request_error)?;

        let envelope: ApiEnvelope<CombinedProgressData> = response
            .into_json()
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        if !envelope.success {
            return Err(ApiError::Server(envelope.message));
        }
        let data = envelope
            .data
            .ok_or_else(|| ApiError::Decode("response has no progress payload".to_string()))?;
        Ok(SubmitOutcome {
            project: data.project,
            updates_applied: data.updates_applied,
            files_uploaded: data.files_uploaded,
            metadata: envelope.metadata.unwrap_or_default(),
            message: envelope.message,
        })
    }
}

/// Non-2xx responses surface the server's own message verbatim; transport
/// failures are reported as a single top-level message. The client treats
/// both uniformly beyond that split, per the backend contract.
fn map_request_error(error: ureq::Error) -> ApiError {
    match error {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| {
                    value
                        .get("message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .filter(|m| !m.trim().is_empty());
            match message {
                Some(message) => ApiError::Server(message),
                None => ApiError::Server(format!("server returned status {code}")),
            }
        }
        other => ApiError::Request(other.to_string()),
    }
}
