use std::path::Path;

use crate::errors::AppError;

/// 10 MiB cap on an accepted resume.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const GENERIC_MIME: &str = "application/octet-stream";

/// Resume formats the parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Doc,
    Docx,
}

impl ResumeFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" => Some(ResumeFormat::Pdf),
            "application/msword" => Some(ResumeFormat::Doc),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(ResumeFormat::Docx)
            }
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ResumeFormat::Pdf => "application/pdf",
            ResumeFormat::Doc => "application/msword",
            ResumeFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn default_extension(self) -> &'static str {
        match self {
            ResumeFormat::Pdf => "pdf",
            ResumeFormat::Doc => "doc",
            ResumeFormat::Docx => "docx",
        }
    }
}

/// Resolves the format from the part's declared content type. Parts without a
/// usable content type fall back to a guess from the original filename.
pub fn validate_type(
    declared: Option<&str>,
    file_name: Option<&str>,
) -> Result<ResumeFormat, AppError> {
    let declared = declared
        .map(str::trim)
        .filter(|mime| !mime.is_empty() && !mime.eq_ignore_ascii_case(GENERIC_MIME));

    let format = match declared {
        Some(mime) => ResumeFormat::from_mime(mime),
        None => file_name
            .and_then(|name| mime_guess::from_path(name).first_raw())
            .and_then(ResumeFormat::from_mime),
    };

    format.ok_or(AppError::InvalidFileType)
}

pub fn validate_size(len: usize) -> Result<(), AppError> {
    if len > MAX_UPLOAD_BYTES {
        return Err(AppError::FileTooLarge);
    }
    Ok(())
}

/// Extension for the stored copy, dot included: the original one when it is a
/// plain short token, otherwise the format's default.
pub fn storage_extension(file_name: Option<&str>, format: ResumeFormat) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| format!(".{}", format.default_extension()))
}
