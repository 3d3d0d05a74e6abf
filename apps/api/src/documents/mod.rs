//! Generated application documents: PDF rendering and object storage.

pub mod pdf;
pub mod store;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::documents::pdf::{BaseFont, PdfBuilder};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover-letter",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resume" => Ok(DocumentKind::Resume),
            "cover-letter" => Ok(DocumentKind::CoverLetter),
            other => Err(format!(
                "Invalid document type '{other}'. Use 'resume' or 'cover-letter'"
            )),
        }
    }
}

/// Reference to a stored document, as returned to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub file_name: String,
    pub size_bytes: usize,
    pub storage_key: String,
    pub download_url: String,
}

/// Keeps ids from escaping their key segment.
pub fn sanitize_segment(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

pub fn document_key(user_id: &str, job_id: &str, kind: DocumentKind) -> String {
    format!(
        "documents/{}/{}/{}.pdf",
        sanitize_segment(user_id),
        sanitize_segment(job_id),
        kind
    )
}

pub fn document_ref(user_id: &str, job_id: &str, kind: DocumentKind, size_bytes: usize) -> DocumentRef {
    let job = sanitize_segment(job_id);
    DocumentRef {
        file_name: format!("{kind}_{job}.pdf"),
        size_bytes,
        storage_key: document_key(user_id, job_id, kind),
        download_url: format!(
            "/api/v1/ai-agent/download/{kind}/{job}?userId={}",
            sanitize_segment(user_id)
        ),
    }
}

/// Font and sizes for one resume template.
#[derive(Debug, Clone, Copy)]
pub struct PdfStyle {
    pub font: BaseFont,
    pub header: f32,
    pub subheader: f32,
    pub body: f32,
}

pub fn style_for(template_key: &str) -> PdfStyle {
    match template_key {
        "executive" => PdfStyle {
            font: BaseFont::TimesRoman,
            header: 18.0,
            subheader: 14.0,
            body: 11.0,
        },
        "creative" => PdfStyle {
            font: BaseFont::Helvetica,
            header: 20.0,
            subheader: 14.0,
            body: 10.0,
        },
        "technical" => PdfStyle {
            font: BaseFont::Courier,
            header: 16.0,
            subheader: 12.0,
            body: 10.0,
        },
        _ => PdfStyle {
            font: BaseFont::Helvetica,
            header: 16.0,
            subheader: 12.0,
            body: 10.0,
        },
    }
}

#[derive(Debug, Clone)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
}

impl Default for PersonalInfo {
    fn default() -> Self {
        Self {
            name: "Your Name".into(),
            email: "your.email@example.com".into(),
            phone: "Your Phone".into(),
            location: "Your Location".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CoverLetterDocument {
    pub date: String,
    pub recipient_name: String,
    pub recipient_title: String,
    pub company_name: String,
    pub company_address: String,
    pub content: String,
    pub sender: PersonalInfo,
}

pub fn render_resume_pdf(doc: &ResumeDocument, template_key: &str) -> Vec<u8> {
    let style = style_for(template_key);
    let info = &doc.personal_info;

    let mut builder = PdfBuilder::new(style.font, style.body)
        .line(&info.name, style.header)
        .paragraph(&info.email)
        .paragraph(&info.phone)
        .paragraph(&info.location)
        .gap(1)
        .line("Professional Summary", style.subheader)
        .paragraph(&doc.summary)
        .gap(1);

    if !doc.skills.is_empty() {
        builder = builder.line("Skills", style.subheader).bullets(&doc.skills);
    }
    builder.build()
}

pub fn render_cover_letter_pdf(doc: &CoverLetterDocument) -> Vec<u8> {
    let style = style_for("modern");
    PdfBuilder::new(style.font, style.body)
        .right_aligned(&doc.date)
        .gap(1)
        .paragraph(&doc.recipient_name)
        .paragraph(&doc.recipient_title)
        .paragraph(&doc.company_name)
        .paragraph(&doc.company_address)
        .gap(2)
        .paragraph(&doc.content)
        .gap(2)
        .paragraph("Sincerely,")
        .gap(1)
        .paragraph(&doc.sender.name)
        .paragraph(&doc.sender.email)
        .paragraph(&doc.sender.phone)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("resume".parse::<DocumentKind>(), Ok(DocumentKind::Resume));
        assert_eq!(
            "cover-letter".parse::<DocumentKind>(),
            Ok(DocumentKind::CoverLetter)
        );
        assert!("cv".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn test_document_key_layout() {
        assert_eq!(
            document_key("user_2x", "job-42", DocumentKind::CoverLetter),
            "documents/user_2x/job-42/cover-letter.pdf"
        );
    }

    #[test]
    fn test_sanitize_blocks_traversal() {
        assert_eq!(sanitize_segment("../../etc"), ".._.._etc");
        assert_eq!(sanitize_segment(".."), "_");
        assert_eq!(sanitize_segment(""), "_");
        assert_eq!(sanitize_segment("a/b c"), "a_b_c");
    }

    #[test]
    fn test_document_ref_matches_download_route() {
        let r = document_ref("u1", "j 1", DocumentKind::Resume, 10);
        assert_eq!(r.file_name, "resume_j_1.pdf");
        assert_eq!(r.download_url, "/api/v1/ai-agent/download/resume/j_1?userId=u1");
        assert_eq!(r.storage_key, "documents/u1/j_1/resume.pdf");
    }

    #[test]
    fn test_style_for_unknown_is_modern() {
        assert_eq!(style_for("unknown").font, BaseFont::Helvetica);
        assert_eq!(style_for("technical").font, BaseFont::Courier);
    }

    #[test]
    fn test_render_resume_includes_summary_and_skills() {
        let doc = ResumeDocument {
            personal_info: PersonalInfo::default(),
            summary: "Backend engineer".into(),
            skills: vec!["Rust".into(), "SQL".into()],
        };
        let pdf = String::from_utf8(render_resume_pdf(&doc, "modern")).unwrap();
        assert!(pdf.contains("(Backend engineer) Tj"));
        assert!(pdf.contains("(- Rust) Tj"));
        assert!(pdf.contains("(Professional Summary) Tj"));
    }

    #[test]
    fn test_render_cover_letter_has_signature_block() {
        let doc = CoverLetterDocument {
            date: "2026-10-18".into(),
            recipient_name: "Hiring Manager".into(),
            recipient_title: "HR Manager".into(),
            company_name: "Initech".into(),
            company_address: "Company Address".into(),
            content: "I am excited to apply.".into(),
            sender: PersonalInfo::default(),
        };
        let pdf = String::from_utf8(render_cover_letter_pdf(&doc)).unwrap();
        assert!(pdf.contains("(Sincerely,) Tj"));
        assert!(pdf.contains("(Initech) Tj"));
    }
}
