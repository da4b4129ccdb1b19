use crate::project::ProjectProgressState;
use crate::shared::fs_atomic::atomic_write_file;
use crate::shared::ids::ProjectId;
use crate::update::files::AttachedFile;
use crate::update::validate::{validate_with_limits, UploadLimits, ValidationErrorSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("a submission for this draft is already in flight")]
    SubmitInFlight,
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("json error at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

fn io_error(path: &Path, source: std::io::Error) -> DraftError {
    DraftError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn json_error(path: &Path, source: serde_json::Error) -> DraftError {
    DraftError::Json {
        path: path.display().to_string(),
        source,
    }
}

/// Bill metadata attached to a financial update. Shared between draft
/// persistence and the `billDetails` wire part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillDetails {
    #[serde(default)]
    pub bill_number: Option<String>,
    #[serde(default)]
    pub bill_date: Option<String>,
    #[serde(default)]
    pub bill_description: Option<String>,
}

/// Draft values for one combined progress update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedUpdate {
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub new_bill_amount: Option<f64>,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub bill_details: BillDetails,
}

/// Gates which half of the proposed update is actually applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ActiveUpdateFlags {
    #[serde(default)]
    pub physical: bool,
    #[serde(default)]
    pub financial: bool,
}

impl ActiveUpdateFlags {
    pub fn physical_only() -> Self {
        Self {
            physical: true,
            financial: false,
        }
    }

    pub fn financial_only() -> Self {
        Self {
            physical: false,
            financial: true,
        }
    }

    pub fn any(self) -> bool {
        self.physical || self.financial
    }
}

/// Form state for one open update dialog.
///
/// Owns the draft, the active flags, and the staged files. Created from a
/// snapshot of the committed state with draft values defaulted to the
/// committed values, and discarded on close or successful submit. The
/// `submitting` guard refuses a second submission while one is in flight.
#[derive(Debug, Clone)]
pub struct DraftSession {
    snapshot: ProjectProgressState,
    pub proposed: ProposedUpdate,
    pub flags: ActiveUpdateFlags,
    files: Vec<AttachedFile>,
    submitting: bool,
}

impl DraftSession {
    pub fn open(snapshot: ProjectProgressState) -> Self {
        let proposed = ProposedUpdate {
            progress: Some(snapshot.progress),
            new_bill_amount: Some(snapshot.bill_amount_submitted),
            remarks: String::new(),
            bill_details: BillDetails::default(),
        };
        Self {
            snapshot,
            proposed,
            flags: ActiveUpdateFlags::default(),
            files: Vec::new(),
            submitting: false,
        }
    }

    pub fn snapshot(&self) -> &ProjectProgressState {
        &self.snapshot
    }

    pub fn files(&self) -> &[AttachedFile] {
        &self.files
    }

    pub fn attach_file(&mut self, file: AttachedFile) {
        self.files.push(file);
    }

    pub fn validate(&self, limits: UploadLimits) -> ValidationErrorSet {
        validate_with_limits(&self.snapshot, &self.proposed, self.flags, &self.files, limits)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Marks the draft as in flight. A second call before [`finish_submit`]
    /// fails locally without any network traffic.
    pub fn begin_submit(&mut self) -> Result<(), DraftError> {
        if self.submitting {
            return Err(DraftError::SubmitInFlight);
        }
        self.submitting = true;
        Ok(())
    }

    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }
}

/// On-disk form of a draft. File contents are not persisted, only the staged
/// file names.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDraft {
    pub proposed: ProposedUpdate,
    pub flags: ActiveUpdateFlags,
    #[serde(default)]
    pub file_names: Vec<String>,
}

impl StoredDraft {
    pub fn from_session(session: &DraftSession) -> Self {
        Self {
            proposed: session.proposed.clone(),
            flags: session.flags,
            file_names: session
                .files
                .iter()
                .map(|file| file.file_name.clone())
                .collect(),
        }
    }
}

pub fn draft_path(state_root: &Path, project_id: &ProjectId) -> PathBuf {
    state_root.join("drafts").join(format!("{project_id}.json"))
}

pub fn save_draft(
    state_root: &Path,
    project_id: &ProjectId,
    session: &DraftSession,
) -> Result<(), DraftError> {
    let path = draft_path(state_root, project_id);
    let body = serde_json::to_vec_pretty(&StoredDraft::from_session(session))
        .map_err(|e| json_error(&path, e))?;
    atomic_write_file(&path, &body).map_err(|e| io_error(&path, e))
}

pub fn load_draft(
    state_root: &Path,
    project_id: &ProjectId,
) -> Result<Option<StoredDraft>, DraftError> {
    let path = draft_path(state_root, project_id);
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| json_error(&path, e))
}

pub fn discard_draft(state_root: &Path, project_id: &ProjectId) -> Result<(), DraftError> {
    let path = draft_path(state_root, project_id);
    if path.exists() {
        fs::remove_file(&path).map_err(|e| io_error(&path, e))?;
    }
    Ok(())
}
