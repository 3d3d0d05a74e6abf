//! Agent workflow: one webhook in, three branch results plus a compatibility report out.
//!
//! Flow for the first scraped job:
//!   analysis → resume refactor (rewrite ∥ cover letter → PDFs)  ∥  compatibility
//!   → email draft → manual apply → next steps.
//!
//! The analysis runs once and feeds both the refactor branch and the
//! compatibility report, so both carry the same match percentage.
//!
//! Any stage error turns into a `WorkflowFailure` carrying manual fallback steps;
//! the workflow never surfaces an HTTP error for LLM or storage trouble.

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};

use crate::agent::gates::{monetization_gates, FeatureGates, Plan};
use crate::agent::models::{
    Branches, CompatibilityResult, EmailDraft, EmailDraftResult, EmailUnavailable,
    FallbackResponse, JobPosting, ManualApplyResult, NextStep, PdfArtifacts, Priority,
    ResumeRefactorResult, Stage, WorkflowFailure, WorkflowInput, WorkflowOutcome, WorkflowReport,
};
use crate::agent::prompts::{
    APPLY_INSTRUCTIONS_TEMPLATE, CAREER_COACH_SYSTEM, EMAIL_BODY_TEMPLATE, EMAIL_SETUP_MESSAGE,
    FALLBACK_MESSAGE, FALLBACK_STEPS, FEEDBACK_PROMPT_TEMPLATE,
};
use crate::cache::Cache;
use crate::documents::store::{DocumentStore, StoreError};
use crate::documents::{
    document_key, document_ref, render_cover_letter_pdf, render_resume_pdf, CoverLetterDocument,
    DocumentKind, PersonalInfo, ResumeDocument, PDF_CONTENT_TYPE,
};
use crate::llm_client::{CompletionProvider, CompletionRequest, LlmError, ModelTier};
use crate::refactor::analysis::JobAnalysis;
use crate::refactor::prompts::fill_template;
use crate::refactor::templates::{cover_letter_template, resume_template};
use crate::refactor::{analyze_resume_for_job, generate_cover_letter, refactor_resume};

const FEEDBACK_TEMPERATURE: f32 = 0.7;
const FEEDBACK_MAX_TOKENS: u32 = 500;

/// Per-user facts the workflow needs but the webhook does not carry.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentContext {
    pub plan: Plan,
    pub email_connected: bool,
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("No scraped jobs to process")]
    NoJobs,

    #[error("LLM call failed during {stage:?}: {source}")]
    Llm {
        stage: Stage,
        #[source]
        source: LlmError,
    },

    #[error("Document upload failed: {0}")]
    Storage(#[from] StoreError),
}

impl AgentError {
    pub fn stage(&self) -> Stage {
        match self {
            AgentError::NoJobs => Stage::Intake,
            AgentError::Llm { stage, .. } => *stage,
            AgentError::Storage(_) => Stage::ResumeRefactor,
        }
    }
}

fn llm_failure(stage: Stage) -> impl FnOnce(LlmError) -> AgentError {
    move |source| AgentError::Llm { stage, source }
}

pub struct AgentWorkflow<'a> {
    llm: &'a dyn CompletionProvider,
    cache: &'a Cache,
    documents: &'a dyn DocumentStore,
}

impl<'a> AgentWorkflow<'a> {
    pub fn new(
        llm: &'a dyn CompletionProvider,
        cache: &'a Cache,
        documents: &'a dyn DocumentStore,
    ) -> Self {
        Self {
            llm,
            cache,
            documents,
        }
    }

    pub async fn process(&self, input: &WorkflowInput, ctx: &AgentContext) -> WorkflowOutcome {
        info!(
            user_id = %input.user_id,
            jobs = input.scraped_jobs.len(),
            plan = ?ctx.plan,
            "Processing webhook"
        );

        match self.run(input, ctx).await {
            Ok(report) => WorkflowOutcome::Completed(Box::new(report)),
            Err(e) => {
                error!(user_id = %input.user_id, stage = ?e.stage(), "Agent workflow failed: {e}");
                WorkflowOutcome::Failed(WorkflowFailure {
                    success: false,
                    error: e.to_string(),
                    failed_stage: e.stage(),
                    fallback: fallback_response(input.scraped_jobs.first()),
                })
            }
        }
    }

    async fn run(&self, input: &WorkflowInput, ctx: &AgentContext) -> Result<WorkflowReport, AgentError> {
        let job = input.scraped_jobs.first().ok_or(AgentError::NoJobs)?;
        let gates = monetization_gates(ctx.plan);

        let analysis = analyze_resume_for_job(self.llm, self.cache, &input.resume, &job.description)
            .await
            .map_err(llm_failure(Stage::ResumeRefactor))?;

        let (resume_refactor, compatibility) = tokio::try_join!(
            self.resume_refactor_branch(input, job, &analysis),
            self.compatibility(input, job, &analysis),
        )?;

        info!(user_id = %input.user_id, "Drafting email and manual apply branches");
        let email_drafting = draft_email(job, &resume_refactor, ctx.email_connected, &gates.gates);
        let manual_apply = manual_apply(job, &resume_refactor);
        let next_steps = next_steps(job, &resume_refactor, &email_drafting);

        Ok(WorkflowReport {
            success: true,
            branches: Branches {
                resume_refactor,
                email_drafting,
                manual_apply,
            },
            compatibility,
            monetization_gates: gates,
            next_steps,
        })
    }

    /// Branch 1: rewrite and cover letter, then both PDFs rendered and stored.
    async fn resume_refactor_branch(
        &self,
        input: &WorkflowInput,
        job: &JobPosting,
        analysis: &JobAnalysis,
    ) -> Result<ResumeRefactorResult, AgentError> {
        info!(user_id = %input.user_id, "Resume refactor for {} at {}", job.title, job.company);

        let resume_tpl = resume_template(input.preference("resumeTemplate").unwrap_or("modern"));
        let letter_tpl =
            cover_letter_template(input.preference("coverLetterTemplate").unwrap_or("standard"));

        let (refactored, cover_letter) = tokio::try_join!(
            refactor_resume(self.llm, &input.resume, &job.description, resume_tpl.key),
            generate_cover_letter(
                self.llm,
                &input.resume,
                &job.description,
                &job.company,
                &job.title,
                letter_tpl.key,
            ),
        )
        .map_err(llm_failure(Stage::ResumeRefactor))?;

        let resume_pdf = render_resume_pdf(
            &ResumeDocument {
                personal_info: PersonalInfo::default(),
                summary: refactored.refactored_resume.clone(),
                skills: analysis.matching_skills.clone(),
            },
            resume_tpl.key,
        );
        let letter_pdf = render_cover_letter_pdf(&CoverLetterDocument {
            date: Utc::now().format("%B %-d, %Y").to_string(),
            recipient_name: "Hiring Manager".into(),
            recipient_title: "HR Manager".into(),
            company_name: job.company.clone(),
            company_address: "Company Address".into(),
            content: cover_letter.clone(),
            sender: PersonalInfo::default(),
        });

        let job_key = job.job_key();
        let pdfs = PdfArtifacts {
            resume: document_ref(&input.user_id, &job_key, DocumentKind::Resume, resume_pdf.len()),
            cover_letter: document_ref(
                &input.user_id,
                &job_key,
                DocumentKind::CoverLetter,
                letter_pdf.len(),
            ),
        };

        let resume_key = document_key(&input.user_id, &job_key, DocumentKind::Resume);
        let letter_key = document_key(&input.user_id, &job_key, DocumentKind::CoverLetter);
        tokio::try_join!(
            self.documents.put(&resume_key, resume_pdf, PDF_CONTENT_TYPE),
            self.documents.put(&letter_key, letter_pdf, PDF_CONTENT_TYPE),
        )?;

        Ok(ResumeRefactorResult {
            analysis: analysis.clone(),
            refactored_resume: refactored.refactored_resume,
            cover_letter,
            improvements: refactored.improvements,
            template: refactored.template,
            pdfs,
            user_consent_required: true,
            consent_prompt: format!(
                "AI will draft a job application for {} at {}. Proceed?",
                job.title, job.company
            ),
        })
    }

    async fn compatibility(
        &self,
        input: &WorkflowInput,
        job: &JobPosting,
        analysis: &JobAnalysis,
    ) -> Result<CompatibilityResult, AgentError> {
        info!(user_id = %input.user_id, "Scoring compatibility");

        let prompt = fill_template(
            FEEDBACK_PROMPT_TEMPLATE,
            &[
                ("title", job.title.as_str()),
                ("company", job.company.as_str()),
                ("job_description", job.description.as_str()),
                ("skills", input.skills.join(", ").as_str()),
                ("experience", input.experience_text().as_str()),
                ("match_percentage", analysis.match_percentage.to_string().as_str()),
            ],
        );

        let feedback = self
            .llm
            .complete(CompletionRequest {
                tier: ModelTier::Feedback,
                system: Some(CAREER_COACH_SYSTEM),
                prompt: &prompt,
                temperature: FEEDBACK_TEMPERATURE,
                max_tokens: Some(FEEDBACK_MAX_TOKENS),
            })
            .await
            .map_err(llm_failure(Stage::Compatibility))?;

        Ok(CompatibilityResult {
            score: analysis.match_percentage,
            feedback,
            matching_skills: analysis.matching_skills.clone(),
            missing_skills: analysis.missing_skills.clone(),
            suggestions: analysis.suggestions.clone(),
        })
    }
}

/// Branch 2. Only users with a connected mailbox get a draft.
pub fn draft_email(
    job: &JobPosting,
    refactor: &ResumeRefactorResult,
    email_connected: bool,
    gates: &FeatureGates,
) -> EmailDraftResult {
    if !email_connected {
        return EmailDraftResult::Unavailable(EmailUnavailable {
            available: false,
            message: EMAIL_SETUP_MESSAGE.to_string(),
            setup_required: true,
        });
    }

    let body = fill_template(
        EMAIL_BODY_TEMPLATE,
        &[
            ("title", job.title.as_str()),
            ("company", job.company.as_str()),
            ("cover_letter", refactor.cover_letter.as_str()),
        ],
    );

    EmailDraftResult::Drafted(EmailDraft {
        available: true,
        email_subject: format!("Application for {} position - [Your Name]", job.title),
        email_content: body,
        attachments: refactor.pdfs.clone(),
        auto_send_available: gates.auto_send,
        user_consent_required: true,
        consent_prompt: format!(
            "Send application email to {} for {} position?",
            job.company, job.title
        ),
    })
}

/// Branch 3.
pub fn manual_apply(job: &JobPosting, refactor: &ResumeRefactorResult) -> ManualApplyResult {
    let analysis = &refactor.analysis;
    let instructions = fill_template(
        APPLY_INSTRUCTIONS_TEMPLATE,
        &[
            ("title", job.title.as_str()),
            ("company", job.company.as_str()),
            ("url", job.url.as_deref().unwrap_or("Not provided")),
            ("score", analysis.match_percentage.to_string().as_str()),
            ("matching_skills", analysis.matching_skills.join(", ").as_str()),
            ("suggestions", analysis.suggestions.join(", ").as_str()),
        ],
    );

    ManualApplyResult {
        job_url: job.url.clone(),
        company: job.company.clone(),
        title: job.title.clone(),
        instructions,
        compatibility_score: analysis.match_percentage,
        skill_match: analysis.matching_skills.clone(),
        missing_skills: analysis.missing_skills.clone(),
        pdfs: refactor.pdfs.clone(),
        mark_as_applied: false,
    }
}

pub fn next_steps(
    job: &JobPosting,
    refactor: &ResumeRefactorResult,
    email: &EmailDraftResult,
) -> Vec<NextStep> {
    let mut steps = Vec::new();
    if refactor.user_consent_required {
        steps.push(NextStep {
            action: "review_resume",
            title: "Review AI-Refactored Resume",
            description: "Preview and edit your enhanced resume before applying",
            priority: Priority::High,
        });
    }
    if email.is_available() && email.needs_consent() {
        steps.push(NextStep {
            action: "send_email",
            title: "Send Application Email",
            description: "Review and send your application via email",
            priority: Priority::High,
        });
    }
    if job.url.as_deref().is_some_and(|u| !u.trim().is_empty()) {
        steps.push(NextStep {
            action: "manual_apply",
            title: "Apply Manually",
            description: "Use the provided link to apply directly",
            priority: Priority::Medium,
        });
    }
    steps
}

pub fn fallback_response(job: Option<&JobPosting>) -> FallbackResponse {
    FallbackResponse {
        message: FALLBACK_MESSAGE.to_string(),
        steps: FALLBACK_STEPS.to_vec(),
        job_url: job.and_then(|j| j.url.clone()),
        company: job.map(|j| j.company.clone()),
        title: job.map(|j| j.title.clone()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::Value;

    use super::*;
    use crate::agent::gates::feature_gates;
    use crate::documents::store::test_support::MemoryStore;
    use crate::refactor::test_support::ScriptedLlm;

    const ANALYSIS: &str = "Missing skills:\n- Kubernetes\n\nMatching skills:\n- Rust\n- PostgreSQL\n\nMatch percentage: 72%\n\nSpecific suggestions:\n- Quantify API latency wins\n\nKey areas:\n- Cloud";

    fn scripted() -> ScriptedLlm {
        ScriptedLlm::new(vec![
            ("Analyze this resume", ANALYSIS),
            ("Original Resume:", "Senior Rust Engineer\nCut p99 latency by 40%"),
            ("Write a professional cover letter", "I am excited to join Initech."),
            ("Analyze this job application", "Strong match. Confidence: 8"),
        ])
    }

    fn input(jobs: Vec<JobPosting>) -> WorkflowInput {
        WorkflowInput {
            resume: "Rust Engineer\nBuilt APIs".into(),
            user_id: "user_1".into(),
            skills: vec!["Rust".into(), "SQL".into()],
            experience: None,
            scraped_jobs: jobs,
            preferences: None,
        }
    }

    fn job() -> JobPosting {
        JobPosting {
            id: Some("job-1".into()),
            title: "Backend Engineer".into(),
            company: "Initech".into(),
            description: "Rust, PostgreSQL, Kubernetes".into(),
            url: Some("https://jobs.example/1".into()),
        }
    }

    #[tokio::test]
    async fn test_successful_run_assembles_report() {
        let llm = scripted();
        let cache = Cache::in_memory(Duration::from_secs(60));
        let store = MemoryStore::default();
        let workflow = AgentWorkflow::new(&llm, &cache, &store);
        let ctx = AgentContext {
            plan: Plan::Free,
            email_connected: true,
        };

        let outcome = workflow.process(&input(vec![job()]), &ctx).await;
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["success"], true);
        assert!(value.get("branches").is_some());
        assert!(value.get("compatibility").is_some());
        assert!(value.get("monetizationGates").is_some());

        let refactor = &value["branches"]["resumeRefactor"];
        assert_eq!(refactor["template"], "Modern Professional");
        assert_eq!(
            refactor["consentPrompt"],
            "AI will draft a job application for Backend Engineer at Initech. Proceed?"
        );
        assert_eq!(refactor["improvements"][0], "Senior Rust Engineer");

        assert_eq!(value["compatibility"]["score"], 72);
        assert_eq!(value["compatibility"]["feedback"], "Strong match. Confidence: 8");
        assert_eq!(value["branches"]["manualApply"]["compatibilityScore"], 72);
        assert_eq!(value["branches"]["emailDrafting"]["autoSendAvailable"], false);

        let actions: Vec<&str> = value["nextSteps"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|s| s["action"].as_str())
            .collect();
        assert_eq!(actions, vec!["review_resume", "send_email", "manual_apply"]);
        assert_eq!(value["nextSteps"][0]["title"], "Review AI-Refactored Resume");
        assert_eq!(
            value["nextSteps"][0]["description"],
            "Preview and edit your enhanced resume before applying"
        );
        assert_eq!(
            value["nextSteps"][1]["description"],
            "Review and send your application via email"
        );
        assert_eq!(
            value["nextSteps"][2]["description"],
            "Use the provided link to apply directly"
        );

        let objects = store.objects.lock().unwrap();
        assert!(objects.contains_key("documents/user_1/job-1/resume.pdf"));
        assert!(objects.contains_key("documents/user_1/job-1/cover-letter.pdf"));
    }

    #[tokio::test]
    async fn test_feedback_uses_coach_settings() {
        let llm = scripted();
        let cache = Cache::in_memory(Duration::from_secs(60));
        let store = MemoryStore::default();
        AgentWorkflow::new(&llm, &cache, &store)
            .process(&input(vec![job()]), &AgentContext::default())
            .await;

        let prompts = llm.prompts.lock().unwrap();
        let feedback = prompts
            .iter()
            .find(|(tier, _)| *tier == ModelTier::Feedback)
            .expect("feedback call");
        assert!(feedback.1.contains("Match Percentage: 72%"));
        assert!(feedback.1.contains("User Skills: Rust, SQL"));
    }

    #[tokio::test]
    async fn test_llm_failure_returns_fallback() {
        let llm = scripted().failing_on("Write a professional cover letter");
        let cache = Cache::in_memory(Duration::from_secs(60));
        let store = MemoryStore::default();

        let outcome = AgentWorkflow::new(&llm, &cache, &store)
            .process(&input(vec![job()]), &AgentContext::default())
            .await;
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["failedStage"], "resumeRefactor");
        assert_eq!(value["fallback"]["steps"].as_array().unwrap().len(), 4);
        assert_eq!(value["fallback"]["company"], "Initech");
        assert_eq!(value["fallback"]["jobUrl"], "https://jobs.example/1");
    }

    #[tokio::test]
    async fn test_analysis_runs_once_and_scores_agree() {
        let llm = scripted();
        let cache = Cache::in_memory(Duration::from_secs(60));
        let store = MemoryStore::default();

        let outcome = AgentWorkflow::new(&llm, &cache, &store)
            .process(&input(vec![job()]), &AgentContext::default())
            .await;
        let value = serde_json::to_value(&outcome).unwrap();

        let analysis_calls = llm
            .prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, prompt)| prompt.contains("Analyze this resume"))
            .count();
        assert_eq!(analysis_calls, 1);
        assert_eq!(
            value["compatibility"]["score"],
            value["branches"]["manualApply"]["compatibilityScore"]
        );
        assert_eq!(
            value["compatibility"]["matchingSkills"],
            value["branches"]["resumeRefactor"]["analysis"]["matchingSkills"]
        );
    }

    #[tokio::test]
    async fn test_feedback_failure_is_compatibility_stage() {
        let llm = scripted().failing_on("Analyze this job application");
        let cache = Cache::in_memory(Duration::from_secs(60));
        let store = MemoryStore::default();

        let outcome = AgentWorkflow::new(&llm, &cache, &store)
            .process(&input(vec![job()]), &AgentContext::default())
            .await;
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["failedStage"], "compatibility");
        assert_eq!(value["fallback"]["title"], "Backend Engineer");
    }

    #[tokio::test]
    async fn test_upload_failure_returns_fallback() {
        let llm = scripted();
        let cache = Cache::in_memory(Duration::from_secs(60));
        let store = MemoryStore::rejecting();

        let outcome = AgentWorkflow::new(&llm, &cache, &store)
            .process(&input(vec![job()]), &AgentContext::default())
            .await;
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["failedStage"], "resumeRefactor");
        assert!(value["error"].as_str().unwrap().starts_with("Document upload failed"));
        assert_eq!(value["fallback"]["steps"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_no_jobs_is_intake_failure() {
        let llm = scripted();
        let cache = Cache::in_memory(Duration::from_secs(60));
        let store = MemoryStore::default();

        let outcome = AgentWorkflow::new(&llm, &cache, &store)
            .process(&input(vec![]), &AgentContext::default())
            .await;
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["failedStage"], "intake");
        assert_eq!(value["fallback"]["company"], Value::Null);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_preferred_template_is_used() {
        let llm = scripted();
        let cache = Cache::in_memory(Duration::from_secs(60));
        let store = MemoryStore::default();
        let mut input = input(vec![job()]);
        input.preferences = Some(serde_json::json!({"resumeTemplate": "technical"}));

        let outcome = AgentWorkflow::new(&llm, &cache, &store)
            .process(&input, &AgentContext::default())
            .await;
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["branches"]["resumeRefactor"]["template"], "Technical Specialist");
    }

    fn refactor_result() -> ResumeRefactorResult {
        let pdf = document_ref("u", "j", DocumentKind::Resume, 1);
        ResumeRefactorResult {
            analysis: Default::default(),
            refactored_resume: String::new(),
            cover_letter: "Letter body".into(),
            improvements: vec![],
            template: "Modern Professional".into(),
            pdfs: PdfArtifacts {
                resume: pdf.clone(),
                cover_letter: pdf,
            },
            user_consent_required: true,
            consent_prompt: String::new(),
        }
    }

    #[test]
    fn test_email_unavailable_without_connection() {
        let result = draft_email(&job(), &refactor_result(), false, &feature_gates(Plan::Pro));
        assert!(!result.is_available());
        match result {
            EmailDraftResult::Unavailable(u) => {
                assert!(u.setup_required);
                assert_eq!(u.message, "Connect Gmail to enable auto-email applications");
            }
            EmailDraftResult::Drafted(_) => panic!("expected unavailable"),
        }
    }

    #[test]
    fn test_email_draft_for_premium_allows_auto_send() {
        let result = draft_email(&job(), &refactor_result(), true, &feature_gates(Plan::Premium));
        match result {
            EmailDraftResult::Drafted(draft) => {
                assert!(draft.auto_send_available);
                assert_eq!(
                    draft.email_subject,
                    "Application for Backend Engineer position - [Your Name]"
                );
                assert!(draft.email_content.contains("Letter body"));
                assert_eq!(
                    draft.consent_prompt,
                    "Send application email to Initech for Backend Engineer position?"
                );
            }
            EmailDraftResult::Unavailable(_) => panic!("expected draft"),
        }
    }

    #[test]
    fn test_manual_apply_without_url() {
        let mut posting = job();
        posting.url = None;
        let result = manual_apply(&posting, &refactor_result());
        assert!(result.instructions.contains("1. Click the job link: Not provided"));
        assert!(!result.mark_as_applied);

        let steps = next_steps(
            &posting,
            &refactor_result(),
            &draft_email(&posting, &refactor_result(), false, &feature_gates(Plan::Free)),
        );
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].action, "review_resume");
    }
}
