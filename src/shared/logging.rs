use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn submission_log_path(state_root: &Path) -> PathBuf {
    state_root.join("logs/submit.log")
}

pub fn append_submission_log_line(state_root: &Path, line: &str) -> std::io::Result<()> {
    let path = submission_log_path(state_root);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    writeln!(file, "{line}")
}
