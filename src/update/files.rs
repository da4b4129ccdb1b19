use std::path::Path;

pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_FILE_COUNT: usize = 15;

/// Supported supporting-document types for progress evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Word,
    Excel,
    Image,
}

impl FileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Word => "word",
            Self::Excel => "excel",
            Self::Image => "image",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Image => "image/png",
        }
    }

    pub fn from_extension(extension: &str) -> Result<Self, String> {
        match extension.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "doc" | "docx" => Ok(Self::Word),
            "xls" | "xlsx" => Ok(Self::Excel),
            "png" | "jpg" | "jpeg" | "gif" | "webp" => Ok(Self::Image),
            other => Err(format!(
                "unsupported file type `.{other}`; allowed: pdf, doc(x), xls(x), images"
            )),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, String> {
        let extension = path
            .extension()
            .and_then(|v| v.to_str())
            .ok_or_else(|| format!("file `{}` has no extension", path.display()))?;
        Self::from_extension(extension)
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A supporting file staged for upload alongside a progress update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedFile {
    pub file_name: String,
    pub kind: FileKind,
    pub content: Vec<u8>,
}

impl AttachedFile {
    pub fn new(file_name: &str, kind: FileKind, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            kind,
            content,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }

    /// Per-file constraint check; returns a human-readable rejection reason.
    pub fn check(&self, max_size_bytes: u64) -> Result<(), String> {
        if self.file_name.trim().is_empty() {
            return Err("attached file must have a name".to_string());
        }
        if self.size_bytes() > max_size_bytes {
            return Err(format!(
                "file `{}` exceeds the {}MB size limit",
                self.file_name,
                max_size_bytes / (1024 * 1024)
            ));
        }
        Ok(())
    }
}
