use crate::client::error::ApiError;
use crate::update::draft::{ActiveUpdateFlags, ProposedUpdate};
use crate::update::files::AttachedFile;

pub const SUPPORTING_FILES_FIELD: &str = "supportingFiles";

/// One part of the combined-progress payload. The payload is a part list
/// rather than a struct of nullable fields, so inactive-flag fields are never
/// serialized at all.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadPart {
    Text {
        name: &'static str,
        value: String,
    },
    Json {
        name: &'static str,
        value: serde_json::Value,
    },
    File {
        name: &'static str,
        file_name: String,
        content_type: &'static str,
        content: Vec<u8>,
    },
}

impl PayloadPart {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text { name, .. } | Self::Json { name, .. } | Self::File { name, .. } => name,
        }
    }
}

/// Builds the part list for one submission. Only fields belonging to active
/// flags are included; `remarks` rides along whenever non-empty.
pub fn combined_progress_parts(
    proposed: &ProposedUpdate,
    flags: ActiveUpdateFlags,
    files: &[AttachedFile],
) -> Result<Vec<PayloadPart>, ApiError> {
    let mut parts = Vec::new();

    if flags.physical {
        if let Some(value) = proposed.progress {
            parts.push(PayloadPart::Text {
                name: "progress",
                value: format_number(value),
            });
        }
    }
    if flags.financial {
        if let Some(value) = proposed.new_bill_amount {
            parts.push(PayloadPart::Text {
                name: "newBillAmount",
                value: format_number(value),
            });
        }
        parts.push(PayloadPart::Json {
            name: "billDetails",
            value: serde_json::to_value(&proposed.bill_details)
                .map_err(|e| ApiError::Decode(e.to_string()))?,
        });
    }
    if !proposed.remarks.trim().is_empty() {
        parts.push(PayloadPart::Text {
            name: "remarks",
            value: proposed.remarks.trim().to_string(),
        });
    }
    for file in files {
        parts.push(PayloadPart::File {
            name: SUPPORTING_FILES_FIELD,
            file_name: sanitize_file_name(&file.file_name),
            content_type: file.kind.mime_type(),
            content: file.content.clone(),
        });
    }

    Ok(parts)
}

fn format_number(value: f64) -> String {
    format!("{value}")
}

fn sanitize_file_name(raw: &str) -> String {
    raw.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

fn random_boundary() -> Result<String, ApiError> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes).map_err(|e| ApiError::Request(e.to_string()))?;
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    Ok(format!("progressctl-{hex}"))
}

/// RFC 2046 multipart/form-data framing of a part list.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    pub content_type: String,
    pub body: Vec<u8>,
}

pub fn encode_multipart(parts: &[PayloadPart]) -> Result<MultipartBody, ApiError> {
    let boundary = random_boundary()?;
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match part {
            PayloadPart::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            PayloadPart::Json { name, value } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"\r\nContent-Type: application/json\r\n\r\n"
                    )
                    .as_bytes(),
                );
                let encoded =
                    serde_json::to_vec(value).map_err(|e| ApiError::Decode(e.to_string()))?;
                body.extend_from_slice(&encoded);
            }
            PayloadPart::File {
                name,
                file_name,
                content_type,
                content,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Ok(MultipartBody {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        body,
    })
}
