//! Wire types for the agent workflow: the n8n webhook payload in, the composite report out.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::gates::MonetizationGates;
use crate::documents::DocumentRef;
use crate::errors::AppError;
use crate::refactor::analysis::JobAnalysis;

// ────────────────────────────────────────────────────────────────────────────
// Input
// ────────────────────────────────────────────────────────────────────────────

/// A scraped job posting as delivered by n8n. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobPosting {
    pub id: Option<String>,
    pub title: String,
    pub company: String,
    pub description: String,
    pub url: Option<String>,
}

impl JobPosting {
    /// Stable identifier used for document keys: the posting id, or a hash of
    /// url/title/company when n8n did not supply one.
    pub fn job_key(&self) -> String {
        if let Some(id) = self.id.as_deref().filter(|id| !id.trim().is_empty()) {
            return id.trim().to_string();
        }
        let mut hasher = blake3::Hasher::new();
        for part in [
            self.url.as_deref().unwrap_or_default(),
            self.title.as_str(),
            self.company.as_str(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update(&[0]);
        }
        hasher.finalize().to_hex()[..16].to_string()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(default)]
    pub resume: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Option<Value>,
    #[serde(default)]
    pub scraped_jobs: Vec<JobPosting>,
    #[serde(default)]
    pub preferences: Option<Value>,
}

/// Validated workflow input.
#[derive(Debug, Clone)]
pub struct WorkflowInput {
    pub resume: String,
    pub user_id: String,
    pub skills: Vec<String>,
    pub experience: Option<Value>,
    pub scraped_jobs: Vec<JobPosting>,
    pub preferences: Option<Value>,
}

impl TryFrom<WebhookPayload> for WorkflowInput {
    type Error = AppError;

    fn try_from(payload: WebhookPayload) -> Result<Self, Self::Error> {
        let resume = payload.resume.filter(|r| !r.trim().is_empty());
        let user_id = payload.user_id.filter(|u| !u.trim().is_empty());
        match (resume, user_id) {
            (Some(resume), Some(user_id)) => Ok(WorkflowInput {
                resume,
                user_id,
                skills: payload.skills,
                experience: payload.experience,
                scraped_jobs: payload.scraped_jobs,
                preferences: payload.preferences,
            }),
            _ => Err(AppError::Validation(
                "Resume and userId are required".to_string(),
            )),
        }
    }
}

impl WorkflowInput {
    /// String-valued entry from `preferences`, e.g. `resumeTemplate`.
    pub fn preference(&self, key: &str) -> Option<&str> {
        self.preferences
            .as_ref()
            .and_then(|p| p.get(key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Experience as prompt text. n8n sends either free text or structured JSON.
    pub fn experience_text(&self) -> String {
        match &self.experience {
            Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
            Some(Value::String(_)) | Some(Value::Null) | None => "Not provided".to_string(),
            Some(other) => other.to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Branch outputs
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfArtifacts {
    pub resume: DocumentRef,
    pub cover_letter: DocumentRef,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRefactorResult {
    pub analysis: JobAnalysis,
    pub refactored_resume: String,
    pub cover_letter: String,
    pub improvements: Vec<String>,
    pub template: String,
    pub pdfs: PdfArtifacts,
    pub user_consent_required: bool,
    pub consent_prompt: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailUnavailable {
    pub available: bool,
    pub message: String,
    pub setup_required: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDraft {
    pub available: bool,
    pub email_subject: String,
    pub email_content: String,
    pub attachments: PdfArtifacts,
    pub auto_send_available: bool,
    pub user_consent_required: bool,
    pub consent_prompt: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EmailDraftResult {
    Unavailable(EmailUnavailable),
    Drafted(EmailDraft),
}

impl EmailDraftResult {
    pub fn is_available(&self) -> bool {
        matches!(self, EmailDraftResult::Drafted(_))
    }

    pub fn needs_consent(&self) -> bool {
        match self {
            EmailDraftResult::Drafted(draft) => draft.user_consent_required,
            EmailDraftResult::Unavailable(_) => false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualApplyResult {
    pub job_url: Option<String>,
    pub company: String,
    pub title: String,
    pub instructions: String,
    pub compatibility_score: u32,
    pub skill_match: Vec<String>,
    pub missing_skills: Vec<String>,
    pub pdfs: PdfArtifacts,
    pub mark_as_applied: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResult {
    pub score: u32,
    pub feedback: String,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextStep {
    pub action: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub priority: Priority,
}

// ────────────────────────────────────────────────────────────────────────────
// Composite report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Branches {
    pub resume_refactor: ResumeRefactorResult,
    pub email_drafting: EmailDraftResult,
    pub manual_apply: ManualApplyResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowReport {
    pub success: bool,
    pub branches: Branches,
    pub compatibility: CompatibilityResult,
    pub monetization_gates: MonetizationGates,
    pub next_steps: Vec<NextStep>,
}

/// Workflow stage, reported when the workflow falls back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Intake,
    ResumeRefactor,
    Compatibility,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackResponse {
    pub message: String,
    pub steps: Vec<&'static str>,
    pub job_url: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowFailure {
    pub success: bool,
    pub error: String,
    pub failed_stage: Stage,
    pub fallback: FallbackResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum WorkflowOutcome {
    Completed(Box<WorkflowReport>),
    Failed(WorkflowFailure),
}
