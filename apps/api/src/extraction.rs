//! Resume text extraction from uploaded PDF or plain-text files.

use axum::extract::Multipart;
use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::routes::envelope::ApiResponse;

static HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("static regex compiles"));
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("static regex compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Text,
}

impl FileKind {
    pub fn from_file_name(name: &str) -> Option<FileKind> {
        let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "txt" => Some(FileKind::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedResume {
    pub file_name: String,
    pub text: String,
    pub character_count: usize,
}

/// CRLF to LF, runs of spaces/tabs collapsed, at most one blank line in a row,
/// and each line trimmed.
pub fn normalize_text(raw: &str) -> String {
    let unix = raw.replace("\r\n", "\n").replace('\r', "\n");
    let collapsed = HORIZONTAL_WS.replace_all(&unix, " ");
    let lines = collapsed
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    EXCESS_NEWLINES.replace_all(&lines, "\n\n").trim().to_string()
}

pub async fn extract_text(kind: FileKind, data: Bytes) -> Result<String, AppError> {
    let raw = match kind {
        FileKind::Text => String::from_utf8(data.to_vec())
            .map_err(|_| AppError::Validation("Text file is not valid UTF-8".to_string()))?,
        // pdf-extract is synchronous and can be slow on large files.
        FileKind::Pdf => tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
            .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?,
    };
    Ok(normalize_text(&raw))
}

/// POST /api/v1/resume/extract  (multipart, field `file`)
pub async fn handle_extract(mut multipart: Multipart) -> Result<ApiResponse<ExtractedResume>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let kind = FileKind::from_file_name(&file_name).ok_or_else(|| {
            AppError::Validation("Unsupported file type. Please upload a PDF or TXT file.".to_string())
        })?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        let text = extract_text(kind, data).await?;
        if text.is_empty() {
            return Err(AppError::Validation(format!("No text found in {file_name}")));
        }
        info!("Extracted {} characters from {file_name}", text.len());

        return Ok(ApiResponse::ok(
            ExtractedResume {
                character_count: text.chars().count(),
                file_name,
                text,
            },
            "Resume text extracted successfully",
        ));
    }

    Err(AppError::Validation("A 'file' field is required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        let raw = "  Jane   Doe\r\n\r\n\r\n\r\nRust\t\tEngineer  \n\n\n\nSkills ";
        assert_eq!(normalize_text(raw), "Jane Doe\n\nRust Engineer\n\nSkills");
    }

    #[test]
    fn test_normalize_keeps_single_blank_line() {
        assert_eq!(normalize_text("a\n\nb\nc"), "a\n\nb\nc");
    }

    #[test]
    fn test_file_kind_by_extension() {
        assert_eq!(FileKind::from_file_name("CV.PDF"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_file_name("resume.txt"), Some(FileKind::Text));
        assert_eq!(FileKind::from_file_name("resume.docx"), None);
        assert_eq!(FileKind::from_file_name("resume"), None);
    }

    #[tokio::test]
    async fn test_text_file_is_normalized() {
        let text = extract_text(FileKind::Text, Bytes::from_static(b"Hello\r\n\r\n\r\nWorld"))
            .await
            .unwrap();
        assert_eq!(text, "Hello\n\nWorld");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_rejected() {
        let result = extract_text(FileKind::Text, Bytes::from_static(&[0xff, 0xfe, 0x00])).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_garbage_pdf_is_rejected() {
        let result = extract_text(FileKind::Pdf, Bytes::from_static(b"not a pdf")).await;
        assert!(result.is_err());
    }
}
