use serde::{Deserialize, Serialize};

/// Extensions (lowercase, without the dot) the upload workflow accepts.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt", "csv", "xlsx", "xls"];

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A persisted metadata record describing a previously uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attachment {
    pub id: String,
    pub key: String,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
}

/// Body of the attachment registration request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAttachment {
    pub key: String,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
}

/// A one-time upload destination issued before the content transfer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadSlot {
    pub key: String,
    pub signed_url: String,
    /// Seconds until the URL expires. Advisory only.
    pub expires_in: u64,
}

/// Acknowledgement returned by the upload destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferReceipt {
    pub success: bool,
    pub key: String,
    pub message: String,
}

/// Lowercased extension of a file name, if it has one.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn is_accepted(file_name: &str) -> bool {
    extension_of(file_name)
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// The accept-list rendered as a file-picker filter (".pdf,.doc,...").
pub fn accept_filter() -> String {
    ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn mime_type_for(file_name: &str) -> &'static str {
    match extension_of(file_name).as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => DEFAULT_MIME_TYPE,
    }
}

/// Human-readable size: bytes below 1 KiB, one decimal for KB and MB.
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
