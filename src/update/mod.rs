pub mod draft;
pub mod files;
pub mod validate;

pub use draft::{
    discard_draft, draft_path, load_draft, save_draft, ActiveUpdateFlags, BillDetails,
    DraftError, DraftSession, ProposedUpdate, StoredDraft,
};
pub use files::{AttachedFile, FileKind, DEFAULT_MAX_FILE_COUNT, MAX_FILE_SIZE_BYTES};
pub use validate::{
    validate, validate_with_limits, UploadLimits, ValidationErrorSet, BILL_DATE_FORMAT,
    MAX_REMARKS_CHARS,
};
