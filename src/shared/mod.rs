pub mod fs_atomic;
pub mod ids;
pub mod logging;

pub use fs_atomic::atomic_write_file;
pub use ids::{validate_identifier_value, ProjectId};
pub use logging::{append_submission_log_line, submission_log_path};
